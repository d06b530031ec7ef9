use std::collections::HashMap;
use std::sync::LazyLock;

/// Closed enumeration of file types the Prompt Template Registry can select
/// a template for. Resolution order: exact lowercase basename match, then
/// lowercase extension match, then `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalFileType {
    Java,
    Javascript,
    Csharp,
    Ruby,
    Python,
    Sql,
    Xml,
    Jsp,
    Markdown,
    Maven,
    Gradle,
    Ant,
    Npm,
    DotnetProj,
    Nuget,
    RubyBundler,
    PythonPip,
    PythonSetup,
    PythonPoetry,
    ShellScript,
    BatchScript,
    Jcl,
    Default,
}

static BASENAME_MAP: LazyLock<HashMap<&'static str, CanonicalFileType>> = LazyLock::new(|| {
    use CanonicalFileType::*;
    HashMap::from([
        ("pom.xml", Maven),
        ("build.gradle", Gradle),
        ("build.gradle.kts", Gradle),
        ("build.xml", Ant),
        ("package.json", Npm),
        ("gemfile", RubyBundler),
        ("requirements.txt", PythonPip),
        ("setup.py", PythonSetup),
        ("pyproject.toml", PythonPoetry),
    ])
});

static EXTENSION_MAP: LazyLock<HashMap<&'static str, CanonicalFileType>> = LazyLock::new(|| {
    use CanonicalFileType::*;
    HashMap::from([
        ("java", Java),
        ("js", Javascript),
        ("jsx", Javascript),
        ("ts", Javascript),
        ("tsx", Javascript),
        ("cs", Csharp),
        ("rb", Ruby),
        ("py", Python),
        ("sql", Sql),
        ("xml", Xml),
        ("jsp", Jsp),
        ("md", Markdown),
        ("markdown", Markdown),
        ("csproj", DotnetProj),
        ("nuspec", Nuget),
        ("sh", ShellScript),
        ("bash", ShellScript),
        ("bat", BatchScript),
        ("cmd", BatchScript),
        ("jcl", Jcl),
    ])
});

impl CanonicalFileType {
    /// Resolve the canonical type for a file, given its basename and
    /// lowercase extension (without the leading dot). Never fails: falls
    /// back to `Default`.
    pub fn resolve(filename: &str, extension: Option<&str>) -> Self {
        let lower_basename = filename.to_lowercase();
        if let Some(found) = BASENAME_MAP.get(lower_basename.as_str()) {
            return *found;
        }
        if let Some(ext) = extension {
            let lower_ext = ext.to_lowercase();
            if let Some(found) = EXTENSION_MAP.get(lower_ext.as_str()) {
                return *found;
            }
        }
        CanonicalFileType::Default
    }
}
