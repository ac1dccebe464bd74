//! Markup encodings of the five resource kinds.
//!
//! A markup document holds two top-level elements: a `HEADER` carrying `MAGIC`
//! and `VERSION` attributes, followed by the kind's root element. Element and
//! attribute names are matched ignoring ASCII case.
//!
//! Documents are parsed into a small owned [`Element`] tree and then walked by
//! the per-kind readers with a [`Cursor`] that mirrors the fixed child order of
//! the format.

mod animation;
mod material;
mod mesh;
mod morph;
mod skeleton;
mod writer;

pub use animation::{read_animation, write_animation};
pub use material::{read_material, write_material};
pub use mesh::{read_mesh, write_mesh};
pub use morph::{read_morph_animation, write_morph_animation};
pub use skeleton::{read_skeleton, write_skeleton};
pub use writer::{MarkupWriter, format_float};

use std::fmt::Display;
use std::str::FromStr;

use cal_shared::{EARLIEST_COMPATIBLE_FILE_VERSION, ResourceFormat, ResourceKind};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{CodecError, CodecResult};
use crate::model::Resource;

/// Decode a markup document of the given kind.
pub fn read_markup(kind: ResourceKind, bytes: &[u8]) -> CodecResult<Resource> {
    Ok(match kind {
        ResourceKind::Skeleton => Resource::Skeleton(read_skeleton(bytes)?),
        ResourceKind::Mesh => Resource::Mesh(read_mesh(bytes)?),
        ResourceKind::Material => Resource::Material(read_material(bytes)?),
        ResourceKind::SkeletalAnimation => Resource::SkeletalAnimation(read_animation(bytes)?),
        ResourceKind::MorphAnimation => Resource::MorphAnimation(read_morph_animation(bytes)?),
    })
}

/// Encode `resource`, which must be of `kind`, as a markup document.
pub fn write_markup(kind: ResourceKind, resource: &Resource) -> CodecResult<Vec<u8>> {
    match (kind, resource) {
        (ResourceKind::Skeleton, Resource::Skeleton(s)) => write_skeleton(s),
        (ResourceKind::Mesh, Resource::Mesh(m)) => write_mesh(m),
        (ResourceKind::Material, Resource::Material(m)) => write_material(m),
        (ResourceKind::SkeletalAnimation, Resource::SkeletalAnimation(a)) => write_animation(a),
        (ResourceKind::MorphAnimation, Resource::MorphAnimation(a)) => write_morph_animation(a),
        (expected, other) => Err(CodecError::WrongKind {
            expected,
            found: other.kind(),
        }),
    }
}

fn syntax(e: impl Display) -> CodecError {
    CodecError::Markup(e.to_string())
}

// ============================================================================
// Element tree
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> CodecResult<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(syntax)?
            .to_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(syntax)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(syntax)?
                .to_owned();
            let value = attr.unescape_value().map_err(syntax)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn required_attr(&self, name: &str) -> CodecResult<&str> {
        self.attr(name).ok_or_else(|| {
            CodecError::markup(format!("<{}> is missing attribute {name}", self.name))
        })
    }

    /// Parse an attribute, failing when it is absent or not a `T`.
    pub fn parse_attr<T: FromStr>(&self, name: &str) -> CodecResult<T> {
        let raw = self.required_attr(name)?;
        raw.trim().parse().map_err(|_| {
            CodecError::markup(format!("<{}> {name}={raw:?} is not a number", self.name))
        })
    }

    /// Like [`parse_attr`](Self::parse_attr) but `None` when absent.
    pub fn parse_optional_attr<T: FromStr>(&self, name: &str) -> CodecResult<Option<T>> {
        match self.attr(name) {
            Some(_) => self.parse_attr(name).map(Some),
            None => Ok(None),
        }
    }

    /// Boolean flag written as an integer, `default` when absent.
    pub fn flag_attr(&self, name: &str, default: bool) -> CodecResult<bool> {
        Ok(self
            .parse_optional_attr::<i32>(name)?
            .map_or(default, |v| v != 0))
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            parent: self,
            index: 0,
        }
    }
}

/// Walks an element's children in document order.
pub struct Cursor<'a> {
    parent: &'a Element,
    index: usize,
}

impl<'a> Cursor<'a> {
    pub fn peek(&self) -> Option<&'a Element> {
        self.parent.children.get(self.index)
    }

    /// Next child, which must be named `name`.
    pub fn expect(&mut self, name: &str) -> CodecResult<&'a Element> {
        match self.peek() {
            Some(child) if child.is(name) => {
                self.index += 1;
                Ok(child)
            }
            Some(child) => Err(CodecError::markup(format!(
                "expected <{name}> in <{}>, found <{}>",
                self.parent.name, child.name
            ))),
            None => Err(CodecError::markup(format!(
                "expected <{name}> in <{}>, found nothing",
                self.parent.name
            ))),
        }
    }

    /// Next child if it is named `name`.
    pub fn next_if(&mut self, name: &str) -> Option<&'a Element> {
        let child = self.peek().filter(|child| child.is(name))?;
        self.index += 1;
        Some(child)
    }

    /// Fails if any child is left unread.
    pub fn finish(&self) -> CodecResult<()> {
        match self.peek() {
            Some(child) => Err(CodecError::markup(format!(
                "unexpected <{}> in <{}>",
                child.name, self.parent.name
            ))),
            None => Ok(()),
        }
    }
}

/// Deepest element nesting accepted. Real documents stay within a handful of
/// levels; the tree is dropped recursively, so depth must stay bounded.
pub const MAX_DEPTH: usize = 64;

/// Parse `bytes` into its top-level elements.
pub fn parse_elements(bytes: &[u8]) -> CodecResult<Vec<Element>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut roots = Vec::new();

    loop {
        match reader.read_event().map_err(syntax)? {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(CodecError::markup(format!(
                        "elements nested deeper than {MAX_DEPTH} levels"
                    )));
                }
                stack.push(Element::open(&start)?)
            }
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut roots, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CodecError::markup("closing tag without opening tag"))?;
                attach(&mut stack, &mut roots, element);
            }
            Event::Text(text) => push_text(&mut stack, &text.unescape().map_err(syntax)?)?,
            Event::CData(data) => {
                push_text(&mut stack, std::str::from_utf8(&data).map_err(syntax)?)?
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CodecError::markup(format!(
            "<{}> is never closed",
            open.name
        )));
    }
    Ok(roots)
}

fn attach(stack: &mut [Element], roots: &mut Vec<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> CodecResult<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(CodecError::markup("text outside of any element")),
    }
}

/// Parse a document and check its `HEADER` against `format`.
///
/// Returns the declared file version and the root element.
pub fn read_document(bytes: &[u8], format: &ResourceFormat) -> CodecResult<(u32, Element)> {
    let mut top = parse_elements(bytes)?.into_iter();

    let header = top
        .next()
        .ok_or_else(|| CodecError::markup("empty document"))?;
    if !header.is("HEADER") {
        return Err(CodecError::markup(format!(
            "document starts with <{}>, not <HEADER>",
            header.name
        )));
    }
    let magic = header.required_attr("MAGIC")?;
    if !magic.eq_ignore_ascii_case(format.markup_magic) {
        return Err(CodecError::BadMagic {
            expected: format.markup_magic.to_owned(),
            found: magic.to_owned(),
        });
    }
    let version: i64 = header.parse_attr("VERSION")?;
    if version < i64::from(EARLIEST_COMPATIBLE_FILE_VERSION) || version > i64::from(u32::MAX) {
        return Err(CodecError::UnsupportedVersion(
            version.clamp(0, i64::from(u32::MAX)) as u32,
        ));
    }

    let root = top.next().ok_or_else(|| {
        CodecError::markup(format!("no <{}> after <HEADER>", format.markup_root))
    })?;
    if !root.is(format.markup_root) {
        return Err(CodecError::markup(format!(
            "expected <{}>, found <{}>",
            format.markup_root, root.name
        )));
    }
    Ok((version as u32, root))
}

// ============================================================================
// Numbers
// ============================================================================

/// Exactly `N` whitespace-separated numbers.
pub fn parse_numbers<T: FromStr + Copy + Default, const N: usize>(
    text: &str,
    what: &str,
) -> CodecResult<[T; N]> {
    let mut out = [T::default(); N];
    let mut tokens = text.split_whitespace();
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| CodecError::markup(format!("{what}: expected {N} numbers in {text:?}")))?;
        *slot = token
            .parse()
            .map_err(|_| CodecError::markup(format!("{what}: {token:?} is not a number")))?;
    }
    if tokens.next().is_some() {
        return Err(CodecError::markup(format!(
            "{what}: more than {N} numbers in {text:?}"
        )));
    }
    Ok(out)
}

/// Like [`parse_numbers`] for floats, but unreadable tokens (such as `1.#QNAN`)
/// become NaN instead of failing. Keyframe data is read this way so that
/// corrupt keyframes can be filtered out instead of sinking the whole file.
pub fn parse_floats_lenient<const N: usize>(text: &str, what: &str) -> CodecResult<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut tokens = text.split_whitespace();
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| CodecError::markup(format!("{what}: expected {N} numbers in {text:?}")))?;
        *slot = token.parse().unwrap_or(f32::NAN);
    }
    if tokens.next().is_some() {
        return Err(CodecError::markup(format!(
            "{what}: more than {N} numbers in {text:?}"
        )));
    }
    Ok(out)
}

pub fn parse_float_lenient(text: &str) -> f32 {
    text.trim().parse().unwrap_or(f32::NAN)
}
