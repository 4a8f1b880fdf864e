//! Parses the official obfuscation mappings, which associate the obfuscated (notch) names
//! of classes, fields and methods with their readable names.
//!
//! The format is line oriented, with a class header followed by indented member lines:
//!
//! ```text
//! # license comment
//! net.minecraft.Foo -> a:
//!     int count -> b
//!     12:15:java.lang.String name(int,net.minecraft.Foo) -> c
//! ```
//!
//! Method descriptors reference obfuscated class names,
//! so methods are resolved only once the whole document has been scanned.
extern crate indexmap;
extern crate failure;
extern crate failure_derive;
extern crate itertools;
extern crate log;
extern crate parking_lot;
extern crate serde;
extern crate serde_derive;

pub mod scanner;
pub mod descriptor;
pub mod source_map;
pub mod official;
pub mod cache;
mod version;
mod utils;

pub use self::version::{MinecraftVersion, InvalidMinecraftVersion};
pub use self::scanner::{Scanner, ParseError, ParseErrorKind};
pub use self::descriptor::{
    PrimitiveType, ClassRemapper, NoRemap, InvalidDescriptor,
    type_name_to_descriptor, descriptor_to_type_name, descriptor_to_full_type_name,
    array_dimensions, decode_method_descriptor
};
pub use self::source_map::{SourceMap, SourceMapBuilder, FieldKey, MethodKey, MappingKey, KeyComparison};
pub use self::official::{
    parse, validate, read, MappingsLoader, DirectoryLoader,
    MappingsNotSubset, MissingMappingsFile
};
pub use self::cache::OfficialMappingsCache;
