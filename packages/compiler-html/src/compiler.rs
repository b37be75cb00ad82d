use blockmail_model::{Attrs, Block, BlockKind};
use tracing::{debug, instrument};

/// Options for HTML compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Contents of `<title>`
    pub title: String,
    /// Emit `data-block-id` on every element
    pub block_ids: bool,
    /// Escape text block content instead of emitting it as rich-text markup
    pub escape_text: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            title: "Email Template".to_string(),
            block_ids: true,
            escape_text: false,
        }
    }
}

struct Context<'a> {
    options: &'a CompileOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile a block tree to a standalone HTML document.
///
/// Blocks are emitted in child order. Blocks of an unrecognised type are
/// skipped; compilation itself cannot fail.
#[instrument(skip(root, options), fields(root_id = %root.id))]
pub fn compile_to_html(root: &Block, options: &CompileOptions) -> String {
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    compile_head(&mut ctx);

    ctx.add_line("<body style=\"margin: 0; padding: 0;\">");
    ctx.indent();
    compile_block(root, &mut ctx);
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    ctx.get_output()
}

/// File name offered when an export is downloaded
pub fn export_file_name(title: &str) -> String {
    let mut slug = String::new();
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "email-template.html".to_string()
    } else {
        format!("{}.html", slug)
    }
}

fn compile_head(ctx: &mut Context) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let title = format!("<title>{}</title>", escape_html(&ctx.options.title));
    ctx.add_line(&title);

    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_block(block: &Block, ctx: &mut Context) {
    match &block.kind {
        BlockKind::Root { children } => {
            compile_wrapper("div", "email-root", block, children, ctx)
        }
        BlockKind::Container { children } => {
            compile_wrapper("div", "block-container", block, children, ctx)
        }
        BlockKind::Section { children } => {
            compile_wrapper("section", "block-section", block, children, ctx)
        }
        BlockKind::Row { children } => compile_wrapper("div", "block-row", block, children, ctx),
        BlockKind::Column { children } => {
            compile_wrapper("div", "block-column", block, children, ctx)
        }

        BlockKind::Text { content } => {
            let body = if ctx.options.escape_text {
                escape_html(content)
            } else {
                content.clone()
            };
            let open = open_tag("div", "block-text", block, ctx.options);
            ctx.add_line(&format!("{}{}</div>", open, body));
        }

        BlockKind::Button { content } => {
            let open = open_tag("a", "block-button", block, ctx.options);
            ctx.add_line(&format!("{}{}</a>", open, escape_html(content)));
        }

        BlockKind::Image => {
            let open = open_tag("img", "block-image", block, ctx.options);
            // Self-closing
            ctx.add_line(&format!("{} />", &open[..open.len() - 1]));
        }

        BlockKind::Unknown => {
            debug!(block_id = %block.id, "Skipping block of unknown type");
        }
    }
}

fn compile_wrapper(tag: &str, class: &str, block: &Block, children: &[Block], ctx: &mut Context) {
    let open = open_tag(tag, class, block, ctx.options);
    ctx.add_line(&open);
    ctx.indent();

    for child in children {
        compile_block(child, ctx);
    }

    ctx.dedent();
    ctx.add_line(&format!("</{}>", tag));
}

fn open_tag(tag: &str, class: &str, block: &Block, options: &CompileOptions) -> String {
    let mut out = format!("<{}", tag);

    let extra_class = block.props.get("class").map(String::as_str).unwrap_or("");
    if extra_class.is_empty() {
        out.push_str(&format!(" class=\"{}\"", class));
    } else {
        out.push_str(&format!(" class=\"{} {}\"", class, escape_html(extra_class)));
    }

    if options.block_ids {
        out.push_str(&format!(" data-block-id=\"{}\"", escape_html(&block.id)));
    }

    for (name, value) in &block.props {
        // class and style are merged above; data-block-id is owned by the compiler
        if matches!(name.as_str(), "class" | "style" | "data-block-id")
            || !is_valid_attribute_name(name)
        {
            continue;
        }
        out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
    }

    if !block.styles.is_empty() {
        out.push_str(&format!(" style=\"{}\"", escape_html(&style_string(&block.styles))));
    }

    out.push('>');
    out
}

fn style_string(styles: &Attrs) -> String {
    styles
        .iter()
        .map(|(key, value)| format!("{}: {};", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}
