use std::io::{self, Write};

use clap::Args;
use log::{info, warn};
use nirust::ParcResult;

use super::{Context, Execute};

#[derive(Debug, Args)]
pub struct ListArgs {}

impl Execute for ListArgs {
    fn execute(&self, ctx: &Context) -> ParcResult<()> {
        let Some(store) = &ctx.atlas_store else {
            warn!("No atlas store configured, nothing to list");
            return Ok(());
        };
        let names = store.list()?;
        info!("{} atlas(es) in {:?}", names.len(), store.root());

        let mut out = io::stdout().lock();
        for name in &names {
            writeln!(out, "{name}")?;
        }
        Ok(())
    }
}
