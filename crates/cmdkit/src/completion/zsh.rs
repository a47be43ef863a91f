//! Zsh backend.
//!
//! One completion function per command node. Each non-leaf function uses
//! `_arguments -C` to list its children and route into a child's dedicated
//! function, which gives unlimited nesting depth:
//!
//! ```text
//! _myapp                -> routes to _myapp__server, _myapp__deploy, ...
//! _myapp__server        -> routes to _myapp__server__start, ...
//! _myapp__server__start -> completes flags only (leaf)
//! ```

use super::{Script, merged_flags};
use crate::app::App;
use crate::command::Command;
use crate::flag::Flag;

pub(super) fn write(app: &App, out: &mut Script) {
    out.line(format!("#compdef {}", app.name()));
    out.blank();
    command_func(app, out, app.name(), app.commands(), &[]);
    out.line(format!("_{}", app.name()));
}

fn command_func(app: &App, out: &mut Script, func: &str, subs: &[Command], cmd_flags: &[Flag]) {
    out.line(format!("_{func}() {{"));

    let flags = merged_flags(cmd_flags, app.global_flags());

    if !subs.is_empty() {
        out.line("    local line state");
        out.blank();
        out.line("    _arguments -C \\");
        for flag in &flags {
            out.line(format!(
                "        '--{}[{}]' \\",
                flag.name(),
                escape(flag.description())
            ));
        }
        out.line("        '1:command:->cmds' \\");
        out.line("        '*::arg:->args'");
        out.blank();

        out.line("    case $state in");
        out.line("    cmds)");
        out.line("        local -a commands");
        out.line("        commands=(");
        for sub in subs {
            let desc = escape(sub.description());
            out.line(format!("            '{}:{desc}'", sub.name()));
            for alias in sub.aliases() {
                out.line(format!("            '{alias}:{desc}'"));
            }
        }
        out.line("        )");
        out.line("        _describe 'command' commands");
        out.line("        ;;");

        out.line("    args)");
        out.line("        case ${line[1]} in");
        for sub in subs {
            let mut names = vec![sub.name().to_string()];
            names.extend(sub.aliases().iter().cloned());
            out.line(format!(
                "        {}) _{func}__{} ;;",
                names.join("|"),
                sub.name()
            ));
        }
        out.line("        esac");
        out.line("        ;;");
        out.line("    esac");
    } else if !flags.is_empty() {
        out.line("    _arguments \\");
        for (i, flag) in flags.iter().enumerate() {
            let trail = if i == flags.len() - 1 { "" } else { " \\" };
            out.line(format!(
                "        '--{}[{}]'{trail}",
                flag.name(),
                escape(flag.description())
            ));
        }
    }

    out.line("}");
    out.blank();

    for sub in subs {
        let child = format!("{func}__{}", sub.name());
        command_func(app, out, &child, sub.subcommands(), sub.flags());
    }
}

/// Descriptions land inside single-quoted zsh strings.
fn escape(text: &str) -> String {
    text.replace('\'', "'\\''")
}
