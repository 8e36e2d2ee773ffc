use crate::Error;
use lopdf::{Dictionary, Document, Object};

pub(crate) trait PdfObjectDeref {
    /// Follow an indirect reference, or return the object itself.
    fn deref<'a>(&'a self, doc: &'a Document) -> Result<&'a Object, Error>;

    /// Owned copy of the dictionary this object is or points to.
    fn to_owned_dict(&self, doc: &Document) -> Result<Dictionary, Error>;

    /// Integer or real value as `f32`.
    fn as_number(&self) -> Option<f32>;
}

impl PdfObjectDeref for Object {
    fn deref<'a>(&'a self, doc: &'a Document) -> Result<&'a Object, Error> {
        match *self {
            Object::Reference(oid) => doc
                .objects
                .get(&oid)
                .ok_or_else(|| Error::Other(format!("PDF Error: NoSuchReference({:#?})", oid))),
            _ => Ok(self),
        }
    }

    fn to_owned_dict(&self, doc: &Document) -> Result<Dictionary, Error> {
        Ok(self.deref(doc)?.as_dict()?.clone())
    }

    #[allow(clippy::unnecessary_cast)]
    fn as_number(&self) -> Option<f32> {
        match *self {
            Object::Integer(value) => Some(value as f32),
            Object::Real(value) => Some(value as f32),
            _ => None,
        }
    }
}
