use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::playback::{PlaybackState, PlaybackSubscriber, ScheduledEvent};
use crate::utils::consts::PROGRESS_UPDATE_INTERVAL_MS;

#[derive(Clone)]
pub struct ProgressManager {
    mp: MultiProgress,
    bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            mp: MultiProgress::new(),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 创建新的进度条
    /// - `id`: 进度条唯一标识
    /// - `total`: 总进度值
    /// - `template`: 进度条模板
    /// - `message`: 初始消息
    pub fn create_bar(
        &self,
        id: &str,
        total: u64,
        template: &str,
        message: &str,
    ) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;

        if bars.contains_key(id) {
            return Err(format!("Progress bar '{}' already exists", id));
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .map_err(|e| format!("Template error: {}", e))?
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let pb = self
            .mp
            .add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(PROGRESS_UPDATE_INTERVAL_MS));

        bars.insert(id.to_string(), pb);
        Ok(())
    }

    /// 更新进度条位置
    pub fn set_position(&self, id: &str, pos: u64) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_position(pos))
    }

    /// 更新进度条消息
    pub fn set_message(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_message(message.to_string()))
    }

    /// 完成进度条（保留显示）
    pub fn finish(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.finish_with_message(message.to_string()))
    }

    /// 中止进度条（保留当前位置）
    pub fn abandon(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.abandon_with_message(message.to_string()))
    }

    /// 完成并清理进度条
    pub fn finish_and_clear(&self, id: &str) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        if let Some(pb) = bars.remove(id) {
            pb.finish_and_clear();
            Ok(())
        } else {
            Err(format!("Progress bar '{}' not found", id))
        }
    }

    /// 检查进度条是否存在
    pub fn exists(&self, id: &str) -> bool {
        if let Ok(bars) = self.bars.lock() {
            bars.contains_key(id)
        } else {
            false
        }
    }

    /// Print above the bars without tearing them
    pub fn println(&self, line: &str) {
        if self.mp.println(line).is_err() {
            println!("{}", line);
        }
    }

    fn with_bar(&self, id: &str, f: impl FnOnce(&ProgressBar)) -> Result<(), String> {
        let bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        if let Some(pb) = bars.get(id) {
            f(pb);
            Ok(())
        } else {
            Err(format!("Progress bar '{}' not found", id))
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves one bar along with the fired events of a plan
pub struct ProgressSubscriber {
    manager: ProgressManager,
    id: String,
}

impl ProgressSubscriber {
    pub fn new(manager: ProgressManager, id: &str) -> Self {
        Self {
            manager,
            id: id.to_string(),
        }
    }
}

impl<T> PlaybackSubscriber<T> for ProgressSubscriber {
    fn on_event(&self, event: &ScheduledEvent<T>) {
        let _ = self
            .manager
            .set_position(&self.id, event.index as u64 + 1);
        let _ = self
            .manager
            .set_message(&self.id, &event.draw.bitstring);
    }

    fn on_state(&self, _plan_id: u64, state: PlaybackState) {
        let _ = match state {
            PlaybackState::Completed => self.manager.finish(&self.id, "done"),
            PlaybackState::Cancelled => self.manager.abandon(&self.id, "stopped"),
            _ => Ok(()),
        };
    }
}

pub mod templates {
    pub const MEASURE: &str =
        "\u{f0e7} MEASURE [{bar:30.magenta}] {percent}% ({pos}/{len} draws) {msg}";
    pub const CLASSICAL: &str =
        "\u{f0e7} CLASSIC [{bar:30.cyan}] {percent}% ({pos}/{len} draws) {msg}";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_lifecycle() {
        let manager = ProgressManager::new();
        manager
            .create_bar("measure", 3, templates::MEASURE, "ghz6")
            .unwrap();
        assert!(manager.exists("measure"));
        assert!(manager.create_bar("measure", 3, templates::MEASURE, "").is_err());
        manager.set_position("measure", 2).unwrap();
        manager.finish("measure", "done").unwrap();
        manager.finish_and_clear("measure").unwrap();
        assert!(!manager.exists("measure"));
        assert!(manager.set_position("measure", 1).is_err());
    }
}
