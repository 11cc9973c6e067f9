use codeflow_chunker::Chunk;
use std::fmt;

/// How many call names are listed in the prompt context.
pub const MAX_PROMPT_CALLS: usize = 5;

/// Node-identifier namespace owned by one chunk.
///
/// Rendered as `C<index>_`, so identifiers stay distinct for any number of
/// chunks (`C0_1`, `C27_4`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodePrefix(usize);

impl NodePrefix {
    pub const fn for_chunk(index: usize) -> Self {
        Self(index)
    }

    /// Identifier of the `n`-th node in this namespace.
    pub fn node(self, n: usize) -> String {
        format!("{self}{n}")
    }
}

impl fmt::Display for NodePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}_", self.0)
    }
}

/// Contextual hints derived from chunk metadata.
fn context_hints(chunk: &Chunk) -> String {
    let mut hints = Vec::new();
    if chunk.has_loops() {
        hints.push("This code contains loops - draw the loop back-edge explicitly.".to_string());
    }
    if chunk.has_conditionals() {
        hints.push(
            "This code has conditionals - use diamond decision nodes with |Yes| and |No| branches."
                .to_string(),
        );
    }
    let calls = chunk.calls();
    if !calls.is_empty() {
        let listed: Vec<&str> = calls
            .iter()
            .take(MAX_PROMPT_CALLS)
            .map(String::as_str)
            .collect();
        hints.push(format!("It calls: {}.", listed.join(", ")));
    }
    if hints.is_empty() {
        "none".to_string()
    } else {
        hints.join(" ")
    }
}

fn worked_example(prefix: NodePrefix) -> String {
    let n = |i| prefix.node(i);
    format!(
        "```mermaid\ngraph TD\n    {a1}([Start Loop])\n    {a2}{{\"i < 10?\"}}\n    {a3}[Process i]\n    {a4}[i++]\n    {a5}([End])\n\n    {a1} --> {a2}\n    {a2} -->|Yes| {a3}\n    {a3} --> {a4}\n    {a4} --> {a2}\n    {a2} -->|No| {a5}\n```",
        a1 = n(1),
        a2 = n(2),
        a3 = n(3),
        a4 = n(4),
        a5 = n(5),
    )
}

/// Build the instruction sent to the model for one chunk.
pub fn build_prompt(chunk: &Chunk, index: usize, total: usize) -> String {
    let prefix = NodePrefix::for_chunk(index);
    format!(
        r#"You are an expert flowchart generator. Convert the code below into a Mermaid flowchart.

CODE CONTEXT:
- Function/Section: {name}
- Type: {kind}
- Position: chunk {position} of {total}
- Complexity: {complexity}
- Hints: {hints}

MERMAID RULES:
1. Start with: graph TD
2. Every node ID must start with {prefix} (e.g. {first}, {second}); never reuse IDs from other sections
3. Node shapes:
   - Start/End: ID([Label])
   - Process: ID[Label]
   - Decision: ID{{"Label?"}}
   - Loop: ID[/"Label"/]
4. Loops MUST show a back-edge (LoopEnd --> LoopStart)
5. if/else MUST show both branches labelled |Yes| and |No|
6. Keep labels short (40 characters at most)
7. Show all important logic flow

EXAMPLE (loop):
{example}

CODE TO CONVERT:
```
{code}
```

Reply with the Mermaid code only, no explanations."#,
        name = chunk.name,
        kind = chunk.kind.tag(),
        position = index + 1,
        total = total,
        complexity = chunk.complexity,
        hints = context_hints(chunk),
        prefix = prefix,
        first = prefix.node(1),
        second = prefix.node(2),
        example = worked_example(prefix),
        code = chunk.code,
    )
}
