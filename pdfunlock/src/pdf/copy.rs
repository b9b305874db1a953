//! Page copy into a fresh, unencrypted document.
//!
//! Every page of the source is copied in order together with everything it references. Object
//! numbers are reassigned in the new document, so nothing of the source's cross-reference layout
//! (or its encryption dictionary) survives.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copy every page of `source`, in order, into a new document with its own page tree.
///
/// The catalog and its root `Pages` node must resolve. A page tree with no kids is a valid
/// zero-page document; an unreachable one is an error, never an empty copy.
pub fn copy_pages(source: &Document) -> Result<Document, lopdf::Error> {
    let root_pages = source.catalog()?.get(b"Pages")?.as_reference()?;
    source.get_dictionary(root_pages)?;

    let mut copier = ObjectCopier::new(source);
    let pages_id = copier.target.new_object_id();

    // Reserve ids for every page up front: links and annotations that point at other pages must
    // land on the copies, not drag the source page tree along.
    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    for &page_id in &source_pages {
        let new_id = copier.target.new_object_id();
        copier.ids.insert(page_id, new_id);
    }

    let mut kids = Vec::with_capacity(source_pages.len());
    for page_id in source_pages {
        let mut page = source.get_dictionary(page_id)?.clone();
        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key)
                && let Some(value) = inherited_attribute(source, page_id, key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        page.remove(b"Parent");

        copier.rewrite_dictionary(&mut page);
        page.set("Parent", Object::Reference(pages_id));

        let new_id = copier.ids[&page_id];
        copier.target.objects.insert(new_id, Object::Dictionary(page));
        kids.push(Object::Reference(new_id));

        copier.drain();
    }

    let mut target = copier.target;
    let count = kids.len() as i64;
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    target.trailer.set("Root", Object::Reference(catalog_id));

    Ok(target)
}

/// Walk up the page tree from `page_id` looking for `key`.
fn inherited_attribute<'a>(source: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut visited = BTreeSet::new();
    let mut current = parent_of(source.get_dictionary(page_id).ok()?)?;

    while visited.insert(current) {
        let node = source.get_dictionary(current).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        current = parent_of(node)?;
    }

    None
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(|parent| parent.as_reference()).ok()
}

/// Copies objects out of `source` on demand, assigning each a new id in `target`.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: Document,
    /// Source id -> target id, for everything already copied or scheduled
    ids: BTreeMap<ObjectId, ObjectId>,
    pending: VecDeque<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            target: Document::with_version(source.version.clone()),
            ids: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    fn map_id(&mut self, id: ObjectId) -> ObjectId {
        if let Some(&mapped) = self.ids.get(&id) {
            return mapped;
        }
        let mapped = self.target.new_object_id();
        self.ids.insert(id, mapped);
        self.pending.push_back(id);
        mapped
    }

    fn rewrite(&mut self, object: &mut Object) {
        match object {
            Object::Reference(id) => *id = self.map_id(*id),
            Object::Array(items) => {
                for item in items.iter_mut() {
                    self.rewrite(item);
                }
            }
            Object::Dictionary(dict) => self.rewrite_dictionary(dict),
            Object::Stream(stream) => self.rewrite_dictionary(&mut stream.dict),
            _ => {}
        }
    }

    fn rewrite_dictionary(&mut self, dict: &mut Dictionary) {
        for (_, value) in dict.iter_mut() {
            self.rewrite(value);
        }
    }

    /// Copy every scheduled object. Iterative, so long chains (outline siblings, linked
    /// annotations) don't grow the stack.
    fn drain(&mut self) {
        while let Some(id) = self.pending.pop_front() {
            let mapped = self.ids[&id];
            // A dangling reference reads as null
            let mut object = self.source.get_object(id).cloned().unwrap_or(Object::Null);

            if let Object::Stream(stream) = &mut object {
                // Decrypted content may differ in length from the stored one, and an indirect
                // /Length would otherwise be copied as a stray object
                let length = stream.content.len() as i64;
                stream.dict.set("Length", length);
            }

            self.rewrite(&mut object);
            self.target.objects.insert(mapped, object);
        }
    }
}
