//! Bash backend.
//!
//! A single completion function resolves the active command path by
//! walking `COMP_WORDS`, then completes from a flat path-keyed options
//! table:
//!
//! ```text
//! COMP_WORDS: [myapp, server, start, --po]
//! Resolver:   ROOT -> ROOT/server -> ROOT/server/start
//! Complete:   options for ROOT/server/start matching "--po"
//! ```

use super::{Script, flag_tokens};
use crate::app::App;
use crate::command::Command;
use crate::flag::Flag;

pub(super) fn write(app: &App, out: &mut Script) {
    let name = app.name();
    out.push(&format!(
        r#"_{name}_completions() {{
    local cur="${{COMP_WORDS[COMP_CWORD]}}"
    COMPREPLY=()

    # Resolve the deepest subcommand path from COMP_WORDS.
    local path="ROOT"
    local i=1
    while [[ $i -lt $COMP_CWORD ]]; do
        case "${{COMP_WORDS[$i]}}" in
            -*) ;;
            *)
                case "${{path}}/${{COMP_WORDS[$i]}}" in
"#
    ));

    resolver_entries(out, app.commands(), "ROOT");

    out.push(
        r#"                esac
                ;;
        esac
        ((i++))
    done

    # Complete based on the resolved path.
    local opts=""
    case "$path" in
"#,
    );

    completion_entry(app, out, "ROOT", app.commands(), &[]);
    completion_tree(app, out, app.commands(), "ROOT");

    out.push(&format!(
        r#"    esac
    COMPREPLY=( $(compgen -W "$opts" -- "$cur") )
}}

complete -F _{name}_completions {name}
"#
    ));
}

/// Case patterns mapping typed words (including aliases) to canonical paths.
fn resolver_entries(out: &mut Script, cmds: &[Command], prefix: &str) {
    for cmd in cmds {
        let canonical = format!("{prefix}/{}", cmd.name());
        let mut patterns = vec![canonical.clone()];
        for alias in cmd.aliases() {
            patterns.push(format!("{prefix}/{alias}"));
        }
        out.line(format!(
            "                    {}) path={canonical:?} ;;",
            patterns.join("|")
        ));
        if !cmd.subcommands().is_empty() {
            resolver_entries(out, cmd.subcommands(), &canonical);
        }
    }
}

/// One `path) opts=...` entry: child names, child aliases, effective flags.
fn completion_entry(app: &App, out: &mut Script, path: &str, subs: &[Command], cmd_flags: &[Flag]) {
    let mut opts: Vec<String> = Vec::new();
    for sub in subs {
        opts.push(sub.name().to_string());
        opts.extend(sub.aliases().iter().cloned());
    }
    opts.extend(flag_tokens(cmd_flags, app.global_flags()));
    if !opts.is_empty() {
        out.line(format!("        {path}) opts={:?} ;;", opts.join(" ")));
    }
}

fn completion_tree(app: &App, out: &mut Script, cmds: &[Command], prefix: &str) {
    for cmd in cmds {
        let path = format!("{prefix}/{}", cmd.name());
        completion_entry(app, out, &path, cmd.subcommands(), cmd.flags());
        if !cmd.subcommands().is_empty() {
            completion_tree(app, out, cmd.subcommands(), &path);
        }
    }
}
