//! Source dialect recognizers.
//!
//! Each dialect supplies an ordered list of definition rules, its
//! usage-extraction patterns, and a reserved-word set. New dialects
//! become new enum variants with their own tables, selected by file
//! extension.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::symbol::SymbolKind;

/// A single ordered pattern rule: the regex's first capture group is
/// the symbol name.
pub struct DefinitionRule {
    pub kind: SymbolKind,
    pub regex: Regex,
}

fn rule(kind: SymbolKind, pattern: &str) -> DefinitionRule {
    DefinitionRule {
        kind,
        regex: Regex::new(pattern).expect("invalid definition pattern"),
    }
}

/// Kotlin definition rules, most specific first so that first-match-wins
/// deduplication picks the narrower kind (e.g. data class over class).
static KOTLIN_RULES: LazyLock<Vec<DefinitionRule>> = LazyLock::new(|| {
    vec![
        rule(SymbolKind::Function, r"\bfun\s+(?:<[^>]*>\s+)?(\w+)\s*\("),
        rule(SymbolKind::DataClass, r"\bdata\s+class\s+(\w+)"),
        rule(SymbolKind::Interface, r"\binterface\s+(\w+)"),
        rule(SymbolKind::Class, r"\benum\s+class\s+(\w+)"),
        rule(SymbolKind::Class, r"\bclass\s+(\w+)"),
        rule(SymbolKind::Object, r"\bobject\s+(\w+)"),
        rule(SymbolKind::Constant, r"\bconst\s+val\s+(\w+)"),
        rule(SymbolKind::Property, r"\b(?:val|var)\s+(\w+)"),
    ]
});

/// Java definition rules.
static JAVA_RULES: LazyLock<Vec<DefinitionRule>> = LazyLock::new(|| {
    vec![
        rule(SymbolKind::Interface, r"\binterface\s+(\w+)"),
        rule(SymbolKind::Class, r"\benum\s+(\w+)"),
        rule(SymbolKind::Class, r"\bclass\s+(\w+)"),
        rule(SymbolKind::Constant, r"\bstatic\s+final\s+[\w<>\[\],\s]+?\b(\w+)\s*[=;]"),
        rule(
            SymbolKind::Function,
            r"(?:public|private|protected|static|final|synchronized|abstract)\s+[\w<>\[\],\s]+?\b(\w+)\s*\(",
        ),
        rule(
            SymbolKind::Property,
            r"(?:public|private|protected)\s+(?:static\s+)?(?:final\s+)?[\w<>\[\]]+\s+(\w+)\s*[=;]",
        ),
    ]
});

static KOTLIN_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+([\w.]+)(?:\s+as\s+\w+)?").unwrap());
static JAVA_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+)\s*;").unwrap());

/// Lowercase-initial identifier followed by an open paren: a call.
static CALL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([a-z]\w*)\s*\(").unwrap());
/// Uppercase-initial identifier followed by an open paren: Kotlin
/// constructor invocation.
static CTOR_CALL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z]\w*)\s*\(").unwrap());
/// `new Foo` style instantiation (Java).
static NEW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bnew\s+([A-Z]\w*)").unwrap());
/// Member access: the identifier after a dot.
static MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\.([a-zA-Z]\w*)").unwrap());

const KOTLIN_RESERVED: &[&str] = &[
    "fun", "val", "var", "if", "else", "when", "for", "while", "do", "return", "class", "object",
    "interface", "import", "package", "is", "in", "as", "null", "true", "false", "this", "super",
    "try", "catch", "finally", "throw", "break", "continue", "by", "it", "println", "print",
    "listOf", "mapOf", "setOf", "mutableListOf", "let", "also", "apply", "run", "with", "to",
    "require", "check",
];

const JAVA_RESERVED: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "return", "new", "class", "interface",
    "enum", "import", "package", "null", "true", "false", "this", "super", "try", "catch",
    "finally", "throw", "throws", "instanceof", "break", "continue", "static", "final", "public",
    "private", "protected", "void", "int", "long", "double", "float", "boolean", "char", "byte",
    "short", "println", "print", "format", "valueOf", "toString", "equals", "hashCode",
];

const KOTLIN_NON_PUBLIC: &[&str] = &["private", "protected", "internal"];
const JAVA_NON_PUBLIC: &[&str] = &["private", "protected"];

/// A supported source dialect, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Kotlin,
    Java,
}

impl Dialect {
    /// Pick a dialect from a file path's extension, if supported.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?;
        match ext {
            "kt" | "kts" => Some(Dialect::Kotlin),
            "java" => Some(Dialect::Java),
            _ => None,
        }
    }

    /// Ordered definition rules for this dialect.
    pub fn definition_rules(&self) -> &'static [DefinitionRule] {
        match self {
            Dialect::Kotlin => &KOTLIN_RULES,
            Dialect::Java => &JAVA_RULES,
        }
    }

    /// The import-statement pattern; group 1 is the dotted target.
    pub fn import_pattern(&self) -> &'static Regex {
        match self {
            Dialect::Kotlin => &KOTLIN_IMPORT_RE,
            Dialect::Java => &JAVA_IMPORT_RE,
        }
    }

    /// Call-like token pattern (lowercase-initial identifiers).
    pub fn call_pattern(&self) -> &'static Regex {
        &CALL_RE
    }

    /// Constructor-like token pattern.
    pub fn instantiation_pattern(&self) -> &'static Regex {
        match self {
            Dialect::Kotlin => &CTOR_CALL_RE,
            Dialect::Java => &NEW_RE,
        }
    }

    /// Member-access token pattern; group 1 is the accessed member.
    pub fn member_pattern(&self) -> &'static Regex {
        &MEMBER_RE
    }

    /// True if `word` is a keyword or common stdlib name that should
    /// never be treated as a symbol usage.
    pub fn is_reserved(&self, word: &str) -> bool {
        match self {
            Dialect::Kotlin => KOTLIN_RESERVED.contains(&word),
            Dialect::Java => JAVA_RESERVED.contains(&word),
        }
    }

    /// True if the line carries an explicit non-public modifier for
    /// this dialect.
    pub fn has_non_public_modifier(&self, line: &str) -> bool {
        let modifiers = match self {
            Dialect::Kotlin => KOTLIN_NON_PUBLIC,
            Dialect::Java => JAVA_NON_PUBLIC,
        };
        line.split(|c: char| !c.is_alphanumeric() && c != '_')
            .any(|token| modifiers.contains(&token))
    }
}
