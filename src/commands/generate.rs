use crate::Context;
use crate::cli::{GenerateArgs, OutputFormat};
use crate::config;
use crate::manifest::Manifest;
use crate::runner;
use crate::ui;
use anyhow::Result;
use nodegen::{Command, CommandPlan};
use serde::Serialize;

/// Which command lists to print
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Create,
    Delete,
    /// Delete commands first, then create commands
    Rebuild,
}

impl Mode {
    fn shows_delete(self) -> bool {
        matches!(self, Self::Delete | Self::Rebuild)
    }

    fn shows_create(self) -> bool {
        matches!(self, Self::Create | Self::Rebuild)
    }
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    delete: Option<&'a [Command]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    create: Option<&'a [Command]>,
}

pub fn run(ctx: &Context, mode: Mode, args: &GenerateArgs) -> Result<()> {
    let config = config::resolve(args)?;
    let manifest = Manifest::load(&args.manifest)?;

    let mut context = manifest.context();
    // providers are only checked when creating instances
    if config.validate && !config.chef_client {
        context = context.with_plugins(runner::knife_plugins()?);
    }

    let plan = nodegen::generate(&manifest.node_declarations(), &context, &config)?;

    if ctx.verbose > 0 && !ctx.quiet {
        ui::note(&format!(
            "# {}: {} create and {} delete commands",
            args.manifest.display(),
            plan.create.len(),
            plan.delete.len()
        ));
    }

    print!("{}", render(&plan, mode, args.format)?);
    Ok(())
}

/// Render the selected command lists
pub fn render(plan: &CommandPlan, mode: Mode, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            let delete = mode.shows_delete().then_some(&plan.delete);
            let create = mode.shows_create().then_some(&plan.create);
            for command in delete.into_iter().chain(create).flatten() {
                out.push_str(&command.command);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let output = Output {
                delete: mode.shows_delete().then_some(plan.delete.as_slice()),
                create: mode.shows_create().then_some(plan.create.as_slice()),
            };
            let mut json = serde_json::to_string_pretty(&output)?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegen::CommandFlags;

    fn plan() -> CommandPlan {
        let mut plan = CommandPlan::new();
        plan.push_create(
            "knife bootstrap serverA",
            CommandFlags {
                allow_failure: true,
                timeout: Some(300),
            },
        );
        plan.push_delete("knife node delete serverA -y");
        plan.push_delete("knife client delete serverA -y");
        plan
    }

    #[test]
    fn test_render_text_modes() {
        let plan = plan();
        assert_eq!(
            render(&plan, Mode::Create, OutputFormat::Text).unwrap(),
            "knife bootstrap serverA\n"
        );
        assert_eq!(
            render(&plan, Mode::Delete, OutputFormat::Text).unwrap(),
            "knife node delete serverA -y\nknife client delete serverA -y\n"
        );
        assert_eq!(
            render(&plan, Mode::Rebuild, OutputFormat::Text).unwrap(),
            "knife node delete serverA -y\nknife client delete serverA -y\nknife bootstrap serverA\n"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render(&plan(), Mode::Create, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("delete").is_none());
        assert_eq!(value["create"][0]["command"], "knife bootstrap serverA");
        assert_eq!(value["create"][0]["allow_failure"], true);
        assert_eq!(value["create"][0]["timeout"], 300);

        let json = render(&plan(), Mode::Rebuild, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["delete"].as_array().unwrap().len(), 2);
        assert_eq!(value["create"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_plan_renders_nothing() {
        let plan = CommandPlan::new();
        assert_eq!(render(&plan, Mode::Rebuild, OutputFormat::Text).unwrap(), "");
    }
}
