//! 命令运行统计.

use std::time::{Duration, Instant};

/// 分段计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间综合.
    #[inline]
    fn total(&self) -> Duration {
        self.consumed
    }
}

/// 命令各阶段耗时统计.
#[derive(Clone, Debug)]
pub struct Profile {
    timer: AccTimer,
    stages: Vec<(&'static str, Duration)>,
}

impl Profile {
    /// 初始化, 并立即开始第一阶段计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            timer: AccTimer::new(),
            stages: Vec::new(),
        }
    }

    /// 结束当前阶段, 记录为 `name`, 并开始下一阶段计时.
    pub fn stage(&mut self, name: &'static str) {
        let d = self.timer.elapsed();
        log::debug!("Stage `{name}` took {} ms", d.as_millis());
        self.stages.push((name, d));
        self.timer.start();
    }

    /// 按记录顺序获取各阶段耗时.
    #[inline]
    pub fn stages(&self) -> &[(&'static str, Duration)] {
        &self.stages
    }

    /// 所有已记录阶段的总耗时.
    #[inline]
    pub fn total(&self) -> Duration {
        self.timer.total()
    }

    /// 最耗时的阶段.
    pub fn most_time_consuming(&self) -> Option<(&'static str, Duration)> {
        self.stages.iter().copied().max_by_key(|(_, d)| *d)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
