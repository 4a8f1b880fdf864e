//! Conversion between java source type names (`int`, `java/lang/String`, `Foo[]`)
//! and JVM type descriptors (`I`, `Ljava/lang/String;`, `[LFoo;`).
//!
//! Class names are never normalized here.
//! Callers are expected to use `/` as the package separator wherever a descriptor is produced.
use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;
use failure_derive::Fail;

use crate::scanner::{Scanner, ParseError, ParseErrorKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void
}
impl PrimitiveType {
    /// The java keyword for this type
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Double => "double",
            PrimitiveType::Float => "float",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Short => "short",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Void => "void",
        }
    }
    /// The single-letter descriptor for this type
    #[inline]
    pub fn code(self) -> char {
        match self {
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Double => 'D',
            PrimitiveType::Float => 'F',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Short => 'S',
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Void => 'V',
        }
    }
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        Some(match name {
            "byte" => PrimitiveType::Byte,
            "char" => PrimitiveType::Char,
            "double" => PrimitiveType::Double,
            "float" => PrimitiveType::Float,
            "int" => PrimitiveType::Int,
            "long" => PrimitiveType::Long,
            "short" => PrimitiveType::Short,
            "boolean" => PrimitiveType::Boolean,
            "void" => PrimitiveType::Void,
            _ => return None
        })
    }
    pub fn from_code(code: char) -> Option<PrimitiveType> {
        Some(match code {
            'B' => PrimitiveType::Byte,
            'C' => PrimitiveType::Char,
            'D' => PrimitiveType::Double,
            'F' => PrimitiveType::Float,
            'I' => PrimitiveType::Int,
            'J' => PrimitiveType::Long,
            'S' => PrimitiveType::Short,
            'Z' => PrimitiveType::Boolean,
            'V' => PrimitiveType::Void,
            _ => return None
        })
    }
}

/// Renames the classes referenced by a type
pub trait ClassRemapper {
    /// The new name of the class, or `None` if it should be left unchanged
    fn remap_class(&self, name: &str) -> Option<&str>;
}
impl<S: BuildHasher> ClassRemapper for IndexMap<String, String, S> {
    #[inline]
    fn remap_class(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
impl<S: BuildHasher> ClassRemapper for HashMap<String, String, S> {
    #[inline]
    fn remap_class(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
impl<'a, R: ClassRemapper + ?Sized> ClassRemapper for &'a R {
    #[inline]
    fn remap_class(&self, name: &str) -> Option<&str> {
        (**self).remap_class(name)
    }
}
/// Leaves every class unchanged
#[derive(Copy, Clone, Debug, Default)]
pub struct NoRemap;
impl ClassRemapper for NoRemap {
    #[inline]
    fn remap_class(&self, _name: &str) -> Option<&str> {
        None
    }
}

#[derive(Debug, Fail)]
#[fail(display = "The provided descriptor {:?} was not a valid type descriptor", _0)]
pub struct InvalidDescriptor(String);
impl InvalidDescriptor {
    #[inline]
    pub fn descriptor(&self) -> &str {
        &self.0
    }
}

/// Convert a source type name like `int[]` or `java/lang/String` into a descriptor,
/// remapping any referenced class.
pub fn type_name_to_descriptor<R: ClassRemapper + ?Sized>(name: &str, remap: &R) -> String {
    let mut name = name;
    let mut descriptor = String::with_capacity(name.len() + 2);
    while name.len() > 2 && name.ends_with("[]") {
        name = &name[..name.len() - 2];
        descriptor.push('[');
    }
    match PrimitiveType::from_name(name) {
        Some(primitive) => descriptor.push(primitive.code()),
        None => {
            let name = remap.remap_class(name).unwrap_or(name);
            descriptor.push('L');
            descriptor.push_str(name);
            descriptor.push(';');
        }
    }
    descriptor
}

/// Convert a type descriptor back into the name of its element type, remapping any referenced class.
///
/// The array dimensions are discarded, so both `[I` and `I` give `int`.
/// Use [`array_dimensions`] to recover them, or [`descriptor_to_full_type_name`].
pub fn descriptor_to_type_name<R: ClassRemapper + ?Sized>(
    descriptor: &str,
    remap: &R
) -> Result<String, InvalidDescriptor> {
    let element = descriptor.trim_start_matches('[');
    let mut chars = element.chars();
    if let (Some(code), None) = (chars.next(), chars.next()) {
        if let Some(primitive) = PrimitiveType::from_code(code) {
            return Ok(primitive.name().into())
        }
    }
    if element.len() > 2 && element.starts_with('L') && element.ends_with(';') {
        let name = &element[1..element.len() - 1];
        Ok(remap.remap_class(name).unwrap_or(name).into())
    } else {
        Err(InvalidDescriptor(descriptor.into()))
    }
}

/// Convert a type descriptor into its full source type name, including a `[]` for each array dimension
pub fn descriptor_to_full_type_name<R: ClassRemapper + ?Sized>(
    descriptor: &str,
    remap: &R
) -> Result<String, InvalidDescriptor> {
    let mut name = descriptor_to_type_name(descriptor, remap)?;
    for _ in 0..array_dimensions(descriptor) {
        name.push_str("[]");
    }
    Ok(name)
}

/// The number of array dimensions of the specified type descriptor
#[inline]
pub fn array_dimensions(descriptor: &str) -> usize {
    descriptor.len() - descriptor.trim_start_matches('[').len()
}

/// Split a method descriptor into its return type and its parameter types
pub fn decode_method_descriptor(descriptor: &str) -> Result<(&str, Vec<&str>), ParseError> {
    let mut scanner = Scanner::new(descriptor);
    scanner.expect("(")?;
    let mut parameters = Vec::new();
    while scanner.peek_required(")")? != ')' {
        parameters.push(scanner.scan_type()?);
    }
    scanner.expect(")")?;
    let return_type = scanner.scan_type()?;
    if let Some(found) = scanner.peek() {
        return Err(scanner.error(ParseErrorKind::UnexpectedChar {
            found, expected: "the end of the descriptor".into()
        }))
    }
    Ok((return_type, parameters))
}

impl<'a> Scanner<'a> {
    /// Scan a single type descriptor, including any array dimensions
    pub fn scan_type(&mut self) -> Result<&'a str, ParseError> {
        let start = self.position();
        self.consume_while(|c| c == '[');
        match self.peek_required("a type descriptor")? {
            'L' => {
                if !self.consume_until(";").ends_with(';') {
                    return Err(self.error(ParseErrorKind::UnexpectedEof { expected: ";".into() }))
                }
            },
            code => {
                if PrimitiveType::from_code(code).is_none() {
                    return Err(self.error(ParseErrorKind::UnexpectedChar {
                        found: code, expected: "a type descriptor".into()
                    }))
                }
                self.next_char();
            }
        }
        Ok(self.consumed_since(start))
    }
    /// Scan a method descriptor like `(ILjava/lang/String;)V`,
    /// returning the whole descriptor and the number of parameters.
    pub fn scan_method_signature(&mut self) -> Result<(&'a str, usize), ParseError> {
        let start = self.position();
        self.expect("(")?;
        let mut parameters = 0;
        while self.peek_required(")")? != ')' {
            self.scan_type()?;
            parameters += 1;
        }
        self.expect(")")?;
        self.scan_type()?;
        Ok((self.consumed_since(start), parameters))
    }
}
