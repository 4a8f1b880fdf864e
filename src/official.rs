//! The official mappings, in the proguard-like format published alongside each release.
//!
//! Every release has separate client and server mappings.
//! The server mappings are expected to be a subset of the client mappings,
//! so once both have been validated only the client mappings are kept.
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use failure::{Error, ResultExt};
use failure_derive::Fail;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info};

use crate::MinecraftVersion;
use crate::descriptor::{ClassRemapper, type_name_to_descriptor};
use crate::scanner::{Scanner, ParseError, ParseErrorKind};
use crate::source_map::{SourceMap, SourceMapBuilder, FieldKey, MethodKey, MappingKey};

const NAME_SEPARATOR: &str = " -> ";
const CLASS_TERMINATOR: &str = ":\n";
const MEMBER_INDENT: &str = "    ";
const STATIC_INITIALIZER: &str = "<clinit>";
/// The maximum number of entries listed by [`MappingsNotSubset`]
const MAXIMUM_LISTED_ENTRIES: usize = 10;

/// A class member, as determined by its readable name
#[derive(Debug, Eq, PartialEq)]
enum Member<'a> {
    Field {
        name: &'a str
    },
    Method {
        name: &'a str,
        parameters: Vec<&'a str>
    }
}
impl<'a> Member<'a> {
    /// Methods are declared like `name(int,java/lang/String)`, while fields are just `name`
    fn classify(readable: &'a str) -> Option<Member<'a>> {
        if !readable.ends_with(')') {
            return Some(Member::Field { name: readable })
        }
        let open = readable.find('(')?;
        let name = &readable[..open];
        let parameters = &readable[(open + 1)..(readable.len() - 1)];
        let parameters = if parameters.is_empty() {
            Vec::new()
        } else {
            parameters.split(',').collect()
        };
        Some(Member::Method { name, parameters })
    }
}

/// A method which can't be given a descriptor until every class is known,
/// since descriptors must reference the obfuscated class names.
#[derive(Debug, Eq, PartialEq, Hash)]
struct StagedMethod {
    class: String,
    name: String,
    return_type: String,
    parameters: Vec<String>
}
impl StagedMethod {
    fn descriptor<R: ClassRemapper>(&self, remap: &R) -> String {
        let mut descriptor = String::from("(");
        for parameter in &self.parameters {
            descriptor.push_str(&type_name_to_descriptor(parameter, remap));
        }
        descriptor.push(')');
        descriptor.push_str(&type_name_to_descriptor(&self.return_type, remap));
        descriptor
    }
}

/// Scan an identifier, converting it to use `/` as the package separator
#[inline]
fn scan_name(scanner: &mut Scanner) -> String {
    scanner.consume_identifier().replace('.', "/")
}

/// Parse the official mappings
///
/// All class names in the result use `/` as the package separator.
pub fn parse(text: &str) -> Result<SourceMap, ParseError> {
    let mut scanner = Scanner::new(text);
    let mut builder = SourceMapBuilder::new();
    let mut staged_methods = IndexMap::new();
    let mut skipped_initializers = 0usize;
    // Skip the license header
    while scanner.try_consume("#") {
        scanner.consume_until("\n");
    }
    while !scanner.at_end() {
        let readable_class = scan_name(&mut scanner);
        scanner.expect(NAME_SEPARATOR)?;
        let obf_class = scan_name(&mut scanner);
        scanner.expect(CLASS_TERMINATOR)?;
        builder.set_class_name(obf_class.clone(), readable_class);
        while scanner.try_consume(MEMBER_INDENT) {
            if scanner.peek().map_or(false, |c| c.is_ascii_digit()) {
                // Ignore line numbers
                scanner.consume_until(":");
                scanner.consume_until(":");
            }
            let member_type = scan_name(&mut scanner);
            scanner.expect(" ")?;
            let readable_member = scan_name(&mut scanner);
            let member = Member::classify(&readable_member).ok_or_else(|| {
                scanner.error(ParseErrorKind::Mismatch { expected: "a parameter list".into() })
            })?;
            scanner.expect(NAME_SEPARATOR)?;
            let obf_member = scan_name(&mut scanner);
            scanner.expect("\n")?;
            match member {
                Member::Field { name } => {
                    builder.set_field_name(FieldKey::new(obf_class.as_str(), obf_member), name);
                },
                Member::Method { .. } if obf_member == STATIC_INITIALIZER => {
                    skipped_initializers += 1;
                },
                Member::Method { name, parameters } => {
                    let staged = StagedMethod {
                        class: obf_class.clone(),
                        name: obf_member,
                        return_type: member_type,
                        parameters: parameters.into_iter().map(String::from).collect()
                    };
                    staged_methods.insert(staged, name.to_string());
                }
            }
        }
    }
    resolve_methods(&mut builder, staged_methods);
    let mappings = builder.frozen();
    debug!(
        "Parsed {} classes, {} fields and {} methods (skipped {} static initializers)",
        mappings.classes().len(),
        mappings.fields().len(),
        mappings.methods().len(),
        skipped_initializers
    );
    Ok(mappings)
}

/// Compute the descriptors of the staged methods, now that every class is known
fn resolve_methods(builder: &mut SourceMapBuilder, staged_methods: IndexMap<StagedMethod, String>) {
    let readable_to_obf: IndexMap<String, String> = builder.classes().iter()
        .map(|(obf, readable)| (readable.clone(), obf.clone()))
        .collect();
    for (method, readable_name) in staged_methods {
        let descriptor = method.descriptor(&readable_to_obf);
        builder.set_method_name(MethodKey::new(method.class, method.name, descriptor), readable_name);
    }
}

/// Check that every entry of the `secondary` mappings is also present in the `primary` mappings
pub fn validate(primary: &SourceMap, secondary: &SourceMap) -> Result<(), MappingsNotSubset> {
    let comparison = primary.compare_keys(secondary);
    if comparison.right_only.is_empty() {
        Ok(())
    } else {
        Err(MappingsNotSubset { extra: comparison.right_only.into_iter().collect() })
    }
}

#[derive(Debug, Fail)]
pub struct MappingsNotSubset {
    extra: Vec<MappingKey>
}
impl MappingsNotSubset {
    /// The entries which are missing from the primary mappings
    #[inline]
    pub fn extra(&self) -> &[MappingKey] {
        &self.extra
    }
}
impl Display for MappingsNotSubset {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f, "Expected a subset of the primary mappings, missing entries ({}): {}",
            self.extra.len(),
            self.extra.iter().take(MAXIMUM_LISTED_ENTRIES).join(", ")
        )?;
        if self.extra.len() > MAXIMUM_LISTED_ENTRIES {
            f.write_str(", ...")?;
        }
        Ok(())
    }
}

/// Supplies the raw official mappings for a release
pub trait MappingsLoader {
    /// Load the text of the client and server mappings
    fn load_official(&self, version: MinecraftVersion) -> Result<(String, String), Error>;
}

/// Loads the mappings from `{root}/{version}/client.txt` and `{root}/{version}/server.txt`
#[derive(Clone, Debug)]
pub struct DirectoryLoader {
    root: PathBuf
}
impl DirectoryLoader {
    #[inline]
    pub fn new<P: Into<PathBuf>>(root: P) -> DirectoryLoader {
        DirectoryLoader { root: root.into() }
    }
    #[inline]
    pub fn version_directory(&self, version: MinecraftVersion) -> PathBuf {
        self.root.join(format!("{}", version))
    }
}
impl MappingsLoader for DirectoryLoader {
    fn load_official(&self, version: MinecraftVersion) -> Result<(String, String), Error> {
        let directory = self.version_directory(version);
        let client = read_mappings_file(&directory.join("client.txt"))?;
        let server = read_mappings_file(&directory.join("server.txt"))?;
        Ok((client, server))
    }
}
fn read_mappings_file(path: &Path) -> Result<String, Error> {
    if !path.is_file() {
        return Err(MissingMappingsFile(path.to_owned()).into())
    }
    Ok(fs::read_to_string(path)?)
}
#[derive(Debug, Fail)]
#[fail(display = "Missing mappings file {:?}", _0)]
pub struct MissingMappingsFile(PathBuf);

/// Load the official mappings for the specified version,
/// validating the server mappings against the client mappings.
pub fn read<L: MappingsLoader + ?Sized>(loader: &L, version: MinecraftVersion) -> Result<SourceMap, Error> {
    let (client, server) = loader.load_official(version)?;
    let client = parse(&client)
        .with_context(|_| format!("Invalid client mappings for {}", version))?;
    let server = parse(&server)
        .with_context(|_| format!("Invalid server mappings for {}", version))?;
    validate(&client, &server)
        .with_context(|_| format!("Unexpected server mappings for {}", version))?;
    info!(
        "Loaded official mappings for {}: {} classes, {} fields and {} methods",
        version,
        client.classes().len(),
        client.fields().len(),
        client.methods().len()
    );
    Ok(client)
}

#[cfg(test)]
mod test {
    use std::env;

    use super::*;

    const CLIENT: &str = "\
# This is the license header
# which spans multiple lines
a.Foo -> c:
    int field -> f
    1:3:void method() -> m
    4:4:java.lang.String get(int,a.Foo) -> g
    a.Foo[] all -> h
    5:10:a.Foo[][] copy(a.Foo[],long) -> i
    11:12:void <clinit>() -> <clinit>
    13:14:void <init>(a.Bar) -> <init>
a.Bar -> d:
    a.Bar$Inner inner -> a
a.Bar$Inner -> e:
";
    const SERVER: &str = "\
a.Foo -> c:
    int field -> f
    void method() -> m
a.Bar -> d:
";

    #[test]
    fn simple_example() {
        let mappings = parse("a.Foo -> c:\n    int field -> f\n    void method() -> m\n").unwrap();
        assert_eq!(mappings.classes().len(), 1);
        assert_eq!(mappings.get_class("c"), Some("a/Foo"));
        assert_eq!(mappings.fields().len(), 1);
        assert_eq!(mappings.get_field("c", "f"), Some("field"));
        assert_eq!(mappings.methods().len(), 1);
        assert_eq!(mappings.get_method("c", "m", "()V"), Some("method"));
    }
    #[test]
    fn method_descriptors() {
        let mappings = parse(CLIENT).unwrap();
        assert_eq!(mappings.get_method("c", "g", "(ILc;)Ljava/lang/String;"), Some("get"));
        assert_eq!(mappings.get_method("c", "i", "([cJ)[[Lc;"), None);
        assert_eq!(mappings.get_method("c", "i", "([LcJ)[[Lc;"), None);
        assert_eq!(mappings.get_method("c", "i", "([Lc;J)[[Lc;"), Some("copy"));
        // Classes declared later in the document are still remapped
        assert_eq!(mappings.get_method("c", "<init>", "(Ld;)V"), Some("<init>"));
        assert_eq!(mappings.get_field("c", "h"), Some("all"));
        assert_eq!(mappings.get_field("d", "a"), Some("inner"));
        assert_eq!(mappings.get_class("e"), Some("a/Bar$Inner"));
    }
    #[test]
    fn skips_static_initializers() {
        let mappings = parse(CLIENT).unwrap();
        assert!(mappings.methods().keys().all(|key| key.name != "<clinit>"));
        assert_eq!(mappings.methods().len(), 4);
    }
    #[test]
    fn ignores_line_numbers() {
        let numbered = parse("a.Foo -> c:\n    12:15:int count -> n\n").unwrap();
        let plain = parse("a.Foo -> c:\n    int count -> n\n").unwrap();
        assert_eq!(numbered, plain);
        assert_eq!(numbered.get_field("c", "n"), Some("count"));
    }
    #[test]
    fn referential_completeness() {
        let mappings = parse(CLIENT).unwrap();
        assert!(mappings.undeclared_classes().is_empty());
        assert_eq!(mappings.classes().len(), 3);
    }
    #[test]
    fn idempotent() {
        assert_eq!(parse(CLIENT).unwrap(), parse(CLIENT).unwrap());
    }
    #[test]
    fn empty_documents() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# Only a comment\n").unwrap().is_empty());
        let mappings = parse("a.Foo -> c:\nb.Bar -> d:\n").unwrap();
        assert_eq!(mappings.classes().len(), 2);
        assert!(mappings.fields().is_empty());
    }
    #[test]
    fn member_classification() {
        assert_eq!(Member::classify("count"), Some(Member::Field { name: "count" }));
        assert_eq!(
            Member::classify("get()"),
            Some(Member::Method { name: "get", parameters: vec![] })
        );
        assert_eq!(
            Member::classify("get(int,a/Foo[])"),
            Some(Member::Method { name: "get", parameters: vec!["int", "a/Foo[]"] })
        );
        assert_eq!(Member::classify("broken)"), None);
    }
    #[test]
    fn syntax_errors() {
        let error = parse("a.Foo -> c:\n    int field => f\n").unwrap_err();
        assert_eq!(*error.kind(), ParseErrorKind::Mismatch { expected: " -> ".into() });
        assert_eq!(error.line(), 1);
        assert_eq!(error.line_text(), "    int field => f");
        let error = parse("# header\na.Foo -> c\n").unwrap_err();
        assert_eq!(*error.kind(), ParseErrorKind::Mismatch { expected: ":\n".into() });
        assert_eq!(error.line(), 1);
        let error = parse("a.Foo -> c:\n    int field -> f").unwrap_err();
        assert_eq!(*error.kind(), ParseErrorKind::UnexpectedEof { expected: "\n".into() });
        let error = parse("a.Foo -> c:\n    int broken) -> f\nb.Bar -> d:\n").unwrap_err();
        assert_eq!(*error.kind(), ParseErrorKind::Mismatch { expected: "a parameter list".into() });
        assert_eq!(error.line(), 1);
        assert_eq!(error.line_text(), "    int broken) -> f");
        assert_eq!(error.column(), 15);
        // Members must be indented by exactly four spaces
        assert!(parse("a.Foo -> c:\n  int field -> f\n").is_err());
    }
    #[test]
    fn validation() {
        let client = parse(CLIENT).unwrap();
        let server = parse(SERVER).unwrap();
        validate(&client, &server).unwrap();
        let error = validate(&server, &client).unwrap_err();
        assert!(error.extra().contains(&MappingKey::Class("e".into())));
        assert!(error.extra().contains(&MappingKey::Field(FieldKey::new("c", "h"))));
        assert!(!error.extra().contains(&MappingKey::Class("c".into())));
    }
    #[test]
    fn validation_extra_class() {
        let a = parse("a.B -> c:\n").unwrap();
        let b = parse("a.B -> c:\nd.E -> f:\n").unwrap();
        let error = validate(&a, &b).unwrap_err();
        assert_eq!(error.extra(), &[MappingKey::Class("f".into())]);
        assert_eq!(
            format!("{}", error),
            "Expected a subset of the primary mappings, missing entries (1): class f"
        );
        validate(&b, &a).unwrap();
    }

    struct StaticLoader;
    impl MappingsLoader for StaticLoader {
        fn load_official(&self, version: MinecraftVersion) -> Result<(String, String), Error> {
            match (version.major(), version.minor()) {
                (1, 14) => Ok((CLIENT.into(), SERVER.into())),
                (1, 15) => Ok((SERVER.into(), CLIENT.into())),
                _ => Err(::failure::format_err!("Unknown version {}", version))
            }
        }
    }
    #[test]
    fn read_validates() {
        let mappings = read(&StaticLoader, "1.14".parse().unwrap()).unwrap();
        assert_eq!(mappings, parse(CLIENT).unwrap());
        let error = read(&StaticLoader, "1.15".parse().unwrap()).unwrap_err();
        assert_eq!(format!("{}", error), "Unexpected server mappings for 1.15");
        assert!(read(&StaticLoader, "1.16".parse().unwrap()).is_err());
    }
    #[test]
    fn directory_loader() {
        let root = env::temp_dir().join(format!("official-mappings-test-{}", ::std::process::id()));
        let loader = DirectoryLoader::new(&root);
        let version: MinecraftVersion = "1.14.4".parse().unwrap();
        let directory = loader.version_directory(version);
        assert_eq!(directory, root.join("1.14.4"));
        fs::create_dir_all(&directory).unwrap();
        fs::write(directory.join("client.txt"), CLIENT).unwrap();
        let error = read(&loader, version).unwrap_err();
        assert!(error.downcast_ref::<MissingMappingsFile>().is_some());
        fs::write(directory.join("server.txt"), SERVER).unwrap();
        let mappings = read(&loader, version).unwrap();
        fs::remove_dir_all(&root).unwrap();
        assert_eq!(mappings.get_class("c"), Some("a/Foo"));
    }
}
