//! Fish backend.
//!
//! Each node's entries are gated by a chain of seen-subcommand conditions,
//! one conjunct per ancestor, with aliases included at every level:
//!
//! ```text
//! server (alias s):  condition = "__fish_seen_subcommand_from server s"
//! server > start:    condition += "; and __fish_seen_subcommand_from start"
//! ```

use super::{Script, merged_flags};
use crate::app::App;
use crate::command::Command;

pub(super) fn write(app: &App, out: &mut Script) {
    let name = app.name();
    out.line(format!("complete -c {name} -f"));
    out.blank();

    for cmd in app.commands() {
        out.line(format!(
            "complete -c {name} -n '__fish_use_subcommand' -a {} -d {:?}",
            cmd.name(),
            cmd.description()
        ));
        for alias in cmd.aliases() {
            out.line(format!(
                "complete -c {name} -n '__fish_use_subcommand' -a {alias} -d {:?}",
                cmd.description()
            ));
        }
    }
    out.blank();

    for cmd in app.commands() {
        let names = with_aliases(cmd);
        command_entries(app, out, cmd, &format!("__fish_seen_subcommand_from {names}"));
    }
}

fn command_entries(app: &App, out: &mut Script, cmd: &Command, condition: &str) {
    for sub in cmd.subcommands() {
        out.line(format!(
            "complete -c {} -n '{condition}' -a {} -d {:?}",
            app.name(),
            sub.name(),
            sub.description()
        ));
        for alias in sub.aliases() {
            out.line(format!(
                "complete -c {} -n '{condition}' -a {alias} -d {:?}",
                app.name(),
                sub.description()
            ));
        }

        let sub_names = with_aliases(sub);
        command_entries(
            app,
            out,
            sub,
            &format!("{condition}; and __fish_seen_subcommand_from {sub_names}"),
        );
    }

    for flag in merged_flags(cmd.flags(), app.global_flags()) {
        let short = match flag.short_char() {
            Some(c) => format!(" -s {c}"),
            None => String::new(),
        };
        out.line(format!(
            "complete -c {} -n '{condition}' -l {}{short} -d {:?}",
            app.name(),
            flag.name(),
            flag.description()
        ));
    }
}

/// `"name alias1 alias2"` for a seen-subcommand condition.
fn with_aliases(cmd: &Command) -> String {
    let mut names = cmd.name().to_string();
    for alias in cmd.aliases() {
        names.push(' ');
        names.push_str(alias);
    }
    names
}
