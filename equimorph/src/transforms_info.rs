//! The `transforms_info` module provides code to output the list of registered
//! transforms and descriptions of the transforms.

use crate::TransformsCLArgs;
use equimorph_lib::transform::TransformRegistry;
use termsize;

/// Function that displays either/or the transform documentation.
pub fn display_transforms_info(params: TransformsCLArgs) {
    if params.list {
        display_simple_transform_list();

        // If we list the short version of the transforms do not display the longer
        // descriptions, even if params.describe is true.
        return;
    }

    if params.describe {
        display_transform_descriptions();
    }
}

fn get_terminal_size() -> termsize::Size {
    // Get the console dimensions.
    if let Some(size) = termsize::get() {
        size
    } else {
        // We get to this case if the tool runs in a non-terminal window (ie as part of
        // a script running somewhere in a workflow.
        termsize::Size {
            // In this use case, rows doesn't matter, we only need a semi-valid cols value.
            rows: 50,
            cols: 80,
        }
    }
}

/// Flow `text` to `width` columns, indenting continuation lines by `indent` spaces.
fn flow_text(text: &str, width: usize, indent: usize) -> String {
    let mut out = String::new();
    let mut column = indent;
    for word in text.split_whitespace() {
        if column + word.len() + 1 > width && column > indent {
            out.push('\n');
            out.push_str(&" ".repeat(indent));
            column = indent;
        } else if column > indent || !out.is_empty() {
            out.push(' ');
            column += 1;
        }
        out.push_str(word);
        column += word.len();
    }
    out
}

/// Write the transform names with their summary text to stdout, names alphabetized.
fn display_simple_transform_list() {
    let terminal_size = get_terminal_size();
    let registry = TransformRegistry::with_builtins();

    let mut names = registry.names();
    names.sort_unstable();

    let name_width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    for name in names {
        let transform = registry.get(name).unwrap();
        let description = flow_text(
            transform.description(),
            terminal_size.cols as usize,
            name_width + 1,
        );
        println!("{:<width$} {}", name, description, width = name_width);
    }
}

/// Write a longer description block per transform to stdout.
fn display_transform_descriptions() {
    let terminal_size = get_terminal_size();
    let registry = TransformRegistry::with_builtins();

    let mut names = registry.names();
    names.sort_unstable();

    for name in names {
        let transform = registry.get(name).unwrap();
        println!("{}", name);
        let description = flow_text(transform.description(), terminal_size.cols as usize, 4);
        println!("    {}", description.trim_start());
        println!();
    }
}
