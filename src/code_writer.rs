pub struct CodeFileOptions {
    pub line_break: String,
    pub indent: String,
}

/// Line-oriented source text builder with indentation tracking.
pub struct CodeFile {
    line_break: String,
    indent_sign: String,
    indent_level: usize,
    content: String,
}

impl CodeFile {
    pub fn new(options: &CodeFileOptions) -> CodeFile {
        CodeFile {
            line_break: options.line_break.to_string(),
            indent_sign: options.indent.to_string(),
            indent_level: 0,
            content: String::new(),
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    // Unbalanced calls are an emitter bug; the level saturates at zero.
    fn deindent(&mut self) {
        debug_assert!(self.indent_level > 0, "deindent below level 0");
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn line(&mut self, code: &str) {
        let indent = self.indent_sign.repeat(self.indent_level);
        self.content.push_str(&indent);
        self.content.push_str(code);
        self.content.push_str(&self.line_break);
    }

    pub fn blank_line(&mut self) {
        self.content.push_str(&self.line_break);
    }

    pub fn begin_indent(&mut self, code: &str) {
        self.line(code);
        self.indent();
    }

    pub fn end_indent(&mut self, code: &str) {
        self.deindent();
        self.line(code);
    }

    /// Writes a JSDoc block. Nothing is written when `lines` is empty.
    pub fn doc_comment(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.line("/**");
        for line in lines {
            let escaped = line.replace("*/", "*\\/");
            if escaped.is_empty() {
                self.line(" *");
            } else {
                self.line(&format!(" * {}", escaped));
            }
        }
        self.line(" */");
    }

    pub fn build_string(self) -> String {
        self.content
    }
}
