//! Literate extraction: converts a markdown document into a runnable
//! script body.
//!
//! Single pass over the lines of the document. Code regions (indented
//! blocks and fenced blocks tagged `js`/`javascript`) are kept verbatim,
//! shell-fenced blocks (`sh`/`bash`) are wrapped in a command literal,
//! and every prose line is commented out. Output line count always
//! equals input line count.

/// Prefix applied to prose and non-executable fence content.
const COMMENT: &str = "// ";

/// Emitted in place of a `sh`/`bash` opening fence: begins a multi-line
/// command literal handed to the command execution facility at runtime.
const SHELL_OPEN: &str = "await $`";

/// Emitted in place of the matching closing fence.
const SHELL_CLOSE: &str = "`";

/// Extraction cursor: which region of the document the current line
/// belongs to. Fenced states remember their opening marker so only the
/// exact bare marker closes the block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Prose,
    Indented,
    FencedScript { close: String },
    FencedShell { close: String },
    FencedOther { close: String },
}

/// Classification of a fence opener's tag.
enum FenceTag {
    Script,
    Shell,
    Other,
}

/// Recognize a fence opener: a run of three or more backticks or tildes
/// at the start of the line. Returns the marker (which also closes the
/// block) and the tag classification of the rest of the line.
fn fence_open(line: &str) -> Option<(String, FenceTag)> {
    let first = line.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run = line.chars().take_while(|&c| c == first).count();
    if run < 3 {
        return None;
    }
    // Marker characters are ASCII, so the char count is a byte offset.
    let (marker, tag) = line.split_at(run);
    let tag = match tag {
        "js" | "javascript" => FenceTag::Script,
        "sh" | "bash" => FenceTag::Shell,
        _ => FenceTag::Other,
    };
    Some((marker.to_string(), tag))
}

/// Consume one line: produce the next state and exactly one output line.
///
/// `prev_blank` is the auxiliary "previous line was blank" flag; it is
/// only written by the prose fall-through rule, so leaving an indented
/// or fenced block does not disturb it.
fn step(state: State, prev_blank: &mut bool, line: &str) -> (State, String) {
    match state {
        State::Prose => {
            if (line.starts_with("    ") || line.starts_with('\t')) && *prev_blank {
                (State::Indented, line.to_string())
            } else if let Some((close, tag)) = fence_open(line) {
                match tag {
                    FenceTag::Script => (State::FencedScript { close }, String::new()),
                    FenceTag::Shell => (State::FencedShell { close }, SHELL_OPEN.to_string()),
                    FenceTag::Other => (State::FencedOther { close }, String::new()),
                }
            } else {
                *prev_blank = line.trim().is_empty();
                let out = if *prev_blank {
                    line.to_string()
                } else {
                    format!("{}{}", COMMENT, line)
                };
                (State::Prose, out)
            }
        }

        State::Indented => {
            if line.starts_with(' ') || line.starts_with('\t') {
                (State::Indented, line.to_string())
            } else if line.is_empty() {
                (State::Indented, String::new())
            } else {
                // Unconditionally commented: fence detection does not
                // re-run on the line that ends an indented block.
                (State::Prose, format!("{}{}", COMMENT, line))
            }
        }

        State::FencedScript { close } => {
            if line == close {
                (State::Prose, String::new())
            } else {
                (State::FencedScript { close }, line.to_string())
            }
        }

        State::FencedShell { close } => {
            if line == close {
                (State::Prose, SHELL_CLOSE.to_string())
            } else {
                // Verbatim, inside the open command literal. Characters
                // that are special inside the literal are not escaped.
                (State::FencedShell { close }, line.to_string())
            }
        }

        State::FencedOther { close } => {
            if line == close {
                (State::Prose, String::new())
            } else {
                (State::FencedOther { close }, format!("{}{}", COMMENT, line))
            }
        }
    }
}

/// Convert a literate document into an executable script body.
///
/// Pure and total: any input produces exactly one output line per input
/// line, joined by newlines.
pub fn extract(source: &str) -> String {
    let mut state = State::Prose;
    // True so a document may begin with an indented block.
    let mut prev_blank = true;
    let mut output: Vec<String> = Vec::new();

    for line in source.split('\n') {
        let (next, out) = step(state, &mut prev_blank, line);
        state = next;
        output.push(out);
    }

    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_is_commented() {
        assert_eq!(extract("hello\n"), "// hello\n");
    }

    #[test]
    fn blank_prose_lines_stay_blank() {
        assert_eq!(extract("one\n\ntwo"), "// one\n\n// two");
    }

    #[test]
    fn indented_block_after_blank_line() {
        let input = "Some text\n\n    indented code\nmore text";
        assert_eq!(
            extract(input),
            "// Some text\n\n    indented code\n// more text"
        );
    }

    #[test]
    fn indented_line_without_preceding_blank_is_prose() {
        assert_eq!(extract("text\n    not code"), "// text\n//     not code");
    }

    #[test]
    fn document_may_open_with_indented_block() {
        assert_eq!(extract("    code()\ntext"), "    code()\n// text");
    }

    #[test]
    fn tab_indentation_starts_a_block() {
        assert_eq!(extract("\tcode()"), "\tcode()");
    }

    #[test]
    fn indented_block_spans_blank_lines() {
        let input = "\n    a()\n\n    b()\nprose";
        assert_eq!(extract(input), "\n    a()\n\n    b()\n// prose");
    }

    #[test]
    fn shallow_indent_continues_a_block() {
        // Four spaces enter the block; after that any leading whitespace
        // keeps it open.
        let input = "\n    a()\n  b()";
        assert_eq!(extract(input), "\n    a()\n  b()");
    }

    #[test]
    fn js_fence_becomes_blank_delimited_code() {
        assert_eq!(extract("```js\nconsole.log(1)\n```"), "\nconsole.log(1)\n");
    }

    #[test]
    fn javascript_tag_is_recognized() {
        assert_eq!(extract("```javascript\nlet x = 1\n```"), "\nlet x = 1\n");
    }

    #[test]
    fn sh_fence_becomes_command_literal() {
        assert_eq!(extract("```sh\necho hi\n```"), "await $`\necho hi\n`");
    }

    #[test]
    fn bash_tag_is_recognized() {
        assert_eq!(extract("```bash\nls -la\n```"), "await $`\nls -la\n`");
    }

    #[test]
    fn shell_content_is_not_escaped() {
        // Backslashes and interpolation syntax pass through untouched.
        assert_eq!(
            extract("```sh\necho `date` ${HOME}\n```"),
            "await $`\necho `date` ${HOME}\n`"
        );
    }

    #[test]
    fn other_fence_is_commented_but_balanced() {
        let input = "```python\nprint(1)\n```\nafter";
        assert_eq!(extract(input), "\n// print(1)\n\n// after");
    }

    #[test]
    fn untagged_fence_is_other() {
        assert_eq!(extract("```\nstuff\n```"), "\n// stuff\n");
    }

    #[test]
    fn tilde_fences_work() {
        assert_eq!(extract("~~~js\nf()\n~~~"), "\nf()\n");
    }

    #[test]
    fn fence_with_trailing_words_is_other() {
        assert_eq!(extract("```js pretty\ncode\n```"), "\n// code\n");
    }

    #[test]
    fn nested_fence_is_block_content() {
        // A new opener inside a fenced block is ordinary content.
        let input = "```js\n```sh\nstill js\n```";
        assert_eq!(extract(input), "\n```sh\nstill js\n");
    }

    #[test]
    fn close_must_match_opening_marker_exactly() {
        // Four backticks open; a three-backtick line is content.
        let input = "````js\ncode\n```\n````";
        assert_eq!(extract(input), "\ncode\n```\n");
    }

    #[test]
    fn two_backticks_is_not_a_fence() {
        assert_eq!(extract("``js"), "// ``js");
    }

    #[test]
    fn fence_inside_indented_block_is_not_special() {
        // Non-indented, non-blank line ends the block and is commented,
        // fence marker or not.
        let input = "\n    code\n```js";
        assert_eq!(extract(input), "\n    code\n// ```js");
    }

    #[test]
    fn line_count_is_preserved() {
        let inputs = [
            "",
            "\n",
            "hello",
            "a\nb\nc\n",
            "```js\nx\n```",
            "```sh\ny\n```",
            "text\n\n    code\ntext\n```python\nz\n```\nend",
            "````\nunclosed other fence\n",
        ];
        for input in inputs {
            let output = extract(input);
            assert_eq!(
                output.split('\n').count(),
                input.split('\n').count(),
                "line count changed for {:?}",
                input
            );
        }
    }

    #[test]
    fn balanced_document_returns_to_prose() {
        // If the machine is back in prose, a trailing line is commented.
        let input = "```js\ncode\n```\n~~~sh\nrun\n~~~\n    block\nextra\ntail";
        let output = extract(input);
        assert!(output.ends_with("// tail"));
    }

    #[test]
    fn step_is_testable_per_state() {
        let mut blank = false;
        let (state, out) = step(State::Prose, &mut blank, "```sh");
        assert_eq!(out, "await $`");
        let (state, out) = step(state, &mut blank, "make all");
        assert_eq!(out, "make all");
        let (state, out) = step(state, &mut blank, "```");
        assert_eq!(out, "`");
        assert_eq!(state, State::Prose);
    }

    #[test]
    fn mixed_document_end_to_end() {
        let input = "\
# Demo

Run the build:

```sh
make build
```

Then check the result:

```js
console.log('done')
```
";
        let expected = "\
// # Demo

// Run the build:

await $`
make build
`

// Then check the result:

\nconsole.log('done')
\n";
        assert_eq!(extract(input), expected);
    }
}
