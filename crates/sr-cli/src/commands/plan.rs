//! Plan command implementation

use anyhow::Result;
use sr_core::ScriptForest;
use std::io::{self, Write};

use crate::cli::{GlobalArgs, PlanArgs, PlanOutput};
use crate::commands::common::build_forest;

/// Execute the plan command
pub(crate) async fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    if global.debug {
        log::info!(
            "Planning {} with relations from {}",
            args.sql_dir.display(),
            args.relations.display()
        );
    }

    let forest = build_forest(&args.relations, &args.sql_dir)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plan(&mut out, &forest, args.output)?;
    out.flush()?;
    Ok(())
}

/// Write the execution order and/or the JSON forest.
///
/// The order lists one id per line, dependencies before dependents.
fn write_plan(out: &mut impl Write, forest: &ScriptForest, output: PlanOutput) -> Result<()> {
    if matches!(output, PlanOutput::All | PlanOutput::Order) {
        for node in forest.execution_order() {
            writeln!(out, "{}", node.id())?;
        }
    }
    if matches!(output, PlanOutput::All | PlanOutput::Json) {
        writeln!(out, "{}", forest.to_json()?)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
