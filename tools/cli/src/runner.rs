//! 程序运行函数.

use crate::commands::{Cli, Context};
use nirust::ParcResult;

/// 按 `--threads` 配置全局 `rayon` 线程池. 未给出时使用可用核心数.
fn configure_threads(threads: Option<usize>) {
    let n = threads.filter(|n| *n > 0).unwrap_or_else(utils::cpus);
    match rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        Ok(()) => log::debug!("Using {n} worker thread(s)"),
        Err(e) => log::warn!("Cannot configure thread pool: {e}"),
    }
}

/// 实际运行.
pub fn run(args: &Cli) -> ParcResult<()> {
    configure_threads(args.threads);

    let ctx = Context {
        atlas_store: utils::loader::atlas_store(args.atlas_dir.clone()),
    };
    if let Some(store) = &ctx.atlas_store {
        log::debug!("Atlas store at {:?}", store.root());
    }

    log::debug!("Dispatching `{}`", args.action.name());
    args.action.execute(&ctx)
}
