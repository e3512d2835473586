/// Fence tag → label shown on the code block. Keys are lower-case.
const LANGUAGES: &[(&str, &str)] = &[
    ("python", "Python"),
    ("javascript", "JavaScript"),
    ("js", "JavaScript"),
    ("typescript", "TypeScript"),
    ("ts", "TypeScript"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c++", "C++"),
    ("csharp", "C#"),
    ("c#", "C#"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("swift", "Swift"),
    ("kotlin", "Kotlin"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("shell", "Shell"),
    ("bash", "Bash"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("markdown", "Markdown"),
    ("md", "Markdown"),
];

/// Resolve a fence tag to its display label, case-insensitively.
///
/// Unknown tags come back unchanged.
pub fn display_language(tag: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(tag))
        .map(|(_, label)| *label)
        .unwrap_or(tag)
}
