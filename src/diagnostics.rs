use crate::parse::SyntaxError;
use annotate_snippets::{Level, Renderer, Snippet};

/// Renders a formula that failed to parse, pointing at the offending token.
/// `origin` names where the formula came from, such as `problem 2, line 4`.
pub fn render_syntax_error(origin: &str, text: &str, error: &SyntaxError) -> String {
    let title = format!("could not parse the formula in {origin}");
    let label = format!("expected {}", error.expected());

    let message = Level::Error.title(&title).snippet(
        Snippet::source(text)
            .origin(origin)
            .annotation(Level::Error.span(error.span()).label(&label)),
    );

    Renderer::plain().render(message).to_string()
}
