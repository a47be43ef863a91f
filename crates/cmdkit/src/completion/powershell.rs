//! PowerShell backend.
//!
//! Same strategy as the bash backend expressed through
//! `Register-ArgumentCompleter`: a flat path-keyed completions hashtable
//! plus an alias resolver hashtable, with the script block walking the
//! `$commandAst` tokens to find the deepest matching canonical path.

use super::{Script, flag_tokens};
use crate::app::App;
use crate::command::Command;
use crate::flag::Flag;

pub(super) fn write(app: &App, out: &mut Script) {
    out.push(&format!(
        r#"Register-ArgumentCompleter -Native -CommandName {} -ScriptBlock {{
    param($wordToComplete, $commandAst, $cursorPosition)

"#,
        app.name()
    ));

    out.line("    $completions = @{");
    completion_entry(app, out, "ROOT", app.commands(), &[]);
    completion_tree(app, out, app.commands(), "ROOT");
    out.line("    }");
    out.blank();

    out.line("    $resolve = @{");
    resolver_entries(out, app.commands(), "ROOT");
    out.line("    }");

    out.push(
        r#"
    # Resolve the deepest subcommand path.
    $line = $commandAst.ToString()
    $tokens = $line -split '\s+'
    $path = 'ROOT'
    for ($i = 1; $i -lt ($tokens.Count - 1); $i++) {
        $t = $tokens[$i]
        if ($t -notlike '-*') {
            $try = "$path/$t"
            if ($resolve.ContainsKey($try)) { $try = $resolve[$try] }
            if ($completions.ContainsKey($try)) { $path = $try }
        }
    }

    if ($completions.ContainsKey($path)) {
        $completions[$path] | Where-Object { $_ -like "$wordToComplete*" } | ForEach-Object {
            [System.Management.Automation.CompletionResult]::new($_, $_, 'ParameterValue', $_)
        }
    }
}
"#,
    );
}

/// One `'path' = @(...)` entry: child names, child aliases, effective flags.
fn completion_entry(app: &App, out: &mut Script, path: &str, subs: &[Command], cmd_flags: &[Flag]) {
    let mut items: Vec<String> = Vec::new();
    for sub in subs {
        items.push(format!("'{}'", sub.name()));
        for alias in sub.aliases() {
            items.push(format!("'{alias}'"));
        }
    }
    for opt in flag_tokens(cmd_flags, app.global_flags()) {
        items.push(format!("'{opt}'"));
    }
    if !items.is_empty() {
        out.line(format!("        '{path}' = @({})", items.join(", ")));
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

/// Alias path to canonical path mappings.
fn resolver_entries(out: &mut Script, cmds: &[Command], prefix: &str) {
    for cmd in cmds {
        let canonical = format!("{prefix}/{}", cmd.name());
        for alias in cmd.aliases() {
            out.line(format!("        '{prefix}/{alias}' = '{canonical}'"));
        }
        if !cmd.subcommands().is_empty() {
            resolver_entries(out, cmd.subcommands(), &canonical);
        }
    }
}
