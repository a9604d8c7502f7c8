//! 批次进度聚合与状态文案轮换

use crate::transfer::{FileId, SelectedFile};
use std::time::{Duration, Instant};

/// 上传过程中轮换显示的状态文案
pub const STATUS_MESSAGES: &[&str] = &[
    "Warming up the wires...",
    "Shoving bytes down the pipe...",
    "Negotiating with the server...",
    "Counting every last bit...",
    "Polishing the packets...",
    "Hold tight, almost there...",
];

#[derive(Debug, Clone)]
struct FileProgress {
    id: FileId,
    total_bytes: u64,
    percent: u8,
}

/// 一个批次内按字节加权的总进度
///
/// 条目按选择顺序保存，以 [`FileId`] 为键。
/// 单个文件的百分比只增不减，因此总进度在批次内单调不减。
#[derive(Debug, Clone, Default)]
pub struct BatchProgress {
    files: Vec<FileProgress>,
    complete: bool,
}

impl BatchProgress {
    pub fn new(files: &[SelectedFile]) -> Self {
        Self {
            files: files
                .iter()
                .map(|f| FileProgress {
                    id: f.id,
                    total_bytes: f.size,
                    percent: 0,
                })
                .collect(),
            complete: false,
        }
    }

    /// 记录某个文件的最新百分比，返回新的总进度
    ///
    /// 未知 id 被忽略。
    pub fn update(&mut self, id: FileId, percent: u8) -> u8 {
        if let Some(entry) = self.files.iter_mut().find(|f| f.id == id) {
            entry.percent = entry.percent.max(percent.min(100));
        }
        self.overall()
    }

    pub fn file_percent(&self, id: FileId) -> Option<u8> {
        self.files.iter().find(|f| f.id == id).map(|f| f.percent)
    }

    /// `floor(Σ uploaded_i / Σ total_i × 100)`
    ///
    /// 总字节为 0 时批次结束前一直是 0。
    pub fn overall(&self) -> u8 {
        if self.complete {
            return 100;
        }

        let total: u128 = self.files.iter().map(|f| f.total_bytes as u128).sum();
        if total == 0 {
            return 0;
        }

        // Σ(size × pct) / Σ size 等价于先换算字节再求百分比，且不丢精度
        let weighted: u128 = self
            .files
            .iter()
            .map(|f| f.total_bytes as u128 * f.percent as u128)
            .sum();
        (weighted / total).min(100) as u8
    }

    /// 批次结束，总进度强制为 100
    pub fn complete(&mut self) -> u8 {
        self.complete = true;
        100
    }
}

/// 状态文案轮换器
///
/// 总进度比上次轮换前进至少 `step` 个百分点，或距上次轮换至少 `interval`，
/// 两者先到者触发轮换。
#[derive(Debug, Clone)]
pub struct StatusRotator {
    messages: &'static [&'static str],
    index: usize,
    step: u8,
    interval: Duration,
    last_percent: u8,
    last_at: Instant,
}

impl StatusRotator {
    pub fn new(step: u8, interval: Duration, now: Instant) -> Self {
        Self::with_messages(STATUS_MESSAGES, step, interval, now)
    }

    pub fn with_messages(
        messages: &'static [&'static str],
        step: u8,
        interval: Duration,
        now: Instant,
    ) -> Self {
        Self {
            messages,
            index: 0,
            step: step.max(1),
            interval,
            last_percent: 0,
            last_at: now,
        }
    }

    pub fn current(&self) -> &'static str {
        self.messages.get(self.index).copied().unwrap_or("Uploading...")
    }

    /// 新批次开始时重置基准
    pub fn reset(&mut self, now: Instant) {
        self.last_percent = 0;
        self.last_at = now;
    }

    /// 观察一次总进度，若触发轮换返回新文案
    pub fn observe(&mut self, overall: u8, now: Instant) -> Option<&'static str> {
        let advanced = overall.saturating_sub(self.last_percent) >= self.step;
        let elapsed = now.saturating_duration_since(self.last_at) >= self.interval;
        if !advanced && !elapsed {
            return None;
        }

        if !self.messages.is_empty() {
            self.index = (self.index + 1) % self.messages.len();
        }
        self.last_percent = overall;
        self.last_at = now;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(sizes: &[u64]) -> Vec<SelectedFile> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| SelectedFile::new(format!("/tmp/f{}", i), format!("f{}", i), *size))
            .collect()
    }

    #[test]
    fn test_weighted_overall_floors() {
        let selected = files(&[10, 30]);
        let mut progress = BatchProgress::new(&selected);

        assert_eq!(progress.update(selected[0].id, 50), 12);
        assert_eq!(progress.update(selected[1].id, 0), 12);
    }

    #[test]
    fn test_file_percent_never_goes_back() {
        let selected = files(&[100]);
        let mut progress = BatchProgress::new(&selected);

        assert_eq!(progress.update(selected[0].id, 70), 70);
        assert_eq!(progress.update(selected[0].id, 40), 70);
        assert_eq!(progress.file_percent(selected[0].id), Some(70));
    }

    #[test]
    fn test_percent_clamped() {
        let selected = files(&[8]);
        let mut progress = BatchProgress::new(&selected);
        assert_eq!(progress.update(selected[0].id, 250), 100);
    }

    #[test]
    fn test_zero_bytes_stays_zero_until_complete() {
        let selected = files(&[0, 0]);
        let mut progress = BatchProgress::new(&selected);

        assert_eq!(progress.update(selected[0].id, 100), 0);
        assert_eq!(progress.overall(), 0);
        assert_eq!(progress.complete(), 100);
        assert_eq!(progress.overall(), 100);
    }

    #[test]
    fn test_unknown_id_ignored() {
        let selected = files(&[10]);
        let mut progress = BatchProgress::new(&selected);
        assert_eq!(progress.update(FileId::new(), 90), 0);
    }

    #[test]
    fn test_overall_monotonic_over_random_walk() {
        let selected = files(&[3, 1_000, 77, 0, 4_096]);
        let mut progress = BatchProgress::new(&selected);
        let mut last = 0;

        // 确定性的“乱序”进度序列，包括回退值
        let mut seed: u32 = 17;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let file = &selected[(seed as usize >> 8) % selected.len()];
            let percent = ((seed >> 16) % 101) as u8;
            let overall = progress.update(file.id, percent);
            assert!(overall >= last, "{} < {}", overall, last);
            last = overall;
        }
    }

    #[test]
    fn test_rotation_on_step() {
        let start = Instant::now();
        let mut rotator = StatusRotator::new(5, Duration::from_millis(3000), start);
        let first = rotator.current();

        assert_eq!(rotator.observe(4, start), None);
        let rotated = rotator.observe(5, start).unwrap();
        assert_ne!(rotated, first);

        // 基准移到 5，需要再到 10
        assert_eq!(rotator.observe(9, start), None);
        assert!(rotator.observe(10, start).is_some());
    }

    #[test]
    fn test_rotation_on_interval() {
        let start = Instant::now();
        let mut rotator = StatusRotator::new(5, Duration::from_millis(3000), start);

        assert_eq!(rotator.observe(1, start + Duration::from_millis(2999)), None);
        assert!(rotator.observe(1, start + Duration::from_millis(3000)).is_some());
        assert_eq!(rotator.observe(2, start + Duration::from_millis(3100)), None);
    }

    #[test]
    fn test_rotation_wraps_around() {
        static TWO: &[&str] = &["a", "b"];
        let start = Instant::now();
        let mut rotator = StatusRotator::with_messages(TWO, 5, Duration::from_secs(3), start);

        assert_eq!(rotator.observe(5, start), Some("b"));
        assert_eq!(rotator.observe(10, start), Some("a"));
    }

    #[test]
    fn test_reset_moves_baseline() {
        let start = Instant::now();
        let mut rotator = StatusRotator::new(5, Duration::from_secs(3), start);
        assert!(rotator.observe(100, start).is_some());

        rotator.reset(start);
        assert!(rotator.observe(5, start).is_some());
    }
}
