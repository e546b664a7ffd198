/// Line-oriented builder for assembly text. Section directives, labels and data
/// declarations start at column zero, instructions are indented one level.
#[derive(Clone, Debug)]
pub struct AsmWriter {
    indentation: String,
    out: String,
}

impl AsmWriter {
    pub fn new(indentation: String) -> AsmWriter {
        AsmWriter {
            indentation,
            out: String::new(),
        }
    }

    pub fn directive(&mut self, directive: &str) {
        self.out.push_str(directive);
        self.out.push('\n');
    }

    pub fn declaration(&mut self, label: &str, directive: &str) {
        self.out.push_str(label);
        self.out.push_str(": ");
        self.directive(directive);
    }

    pub fn label(&mut self, label: &str) {
        self.out.push_str(label);
        self.out.push_str(":\n");
    }

    pub fn instruction(&mut self, instruction: &str) {
        self.out.push_str(&self.indentation);
        self.directive(instruction);
    }

    /// Appends everything written to `other`, keeping its layout.
    pub fn append(&mut self, other: &AsmWriter) {
        self.out.push_str(&other.out);
    }

    /// Writes a block where lines ending in `:` are labels and all others are instructions.
    pub fn routine(&mut self, lines: &[&str]) {
        for line in lines {
            if let Some(label) = line.strip_suffix(':') {
                self.label(label);
            } else {
                self.instruction(line);
            }
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_layout() {
        let mut writer = AsmWriter::new(String::from("  "));
        writer.directive(".data");
        writer.declaration("newline", ".asciiz \"\\n\"");
        writer.label("main");
        writer.instruction("li $v0, 10");
        writer.routine(&["loop:", "j loop"]);

        assert_eq!(".data\nnewline: .asciiz \"\\n\"\nmain:\n  li $v0, 10\nloop:\n  j loop\n", writer.into_string());
    }

    #[test]
    pub fn test_append_keeps_layout() {
        let mut first = AsmWriter::new(String::from("    "));
        let mut second = AsmWriter::new(String::from("\t"));
        first.label("a");
        second.instruction("nop");
        first.append(&second);

        assert_eq!("a:\n\tnop\n", first.into_string());
    }
}
