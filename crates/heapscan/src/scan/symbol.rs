//! Symbol Search - Locate a Symbol by Name
//!
//! Walks `[start, end)` object by object. Every symbol header met on the
//! way has its name slot checked, in order:
//!
//! 1. the slot is an other-pointer (uninitialized slots are not)
//! 2. the pointer targets managed memory
//! 3. the target is a base string, or a character string when unicode
//!    matching is on
//! 4. the stored length equals the target length (fixnum compare)
//! 5. the characters match
//!
//! The first symbol passing all five is returned. Anything failing a step
//! is skipped; the walk then advances by the object's size in words.

use super::ScanContext;
use crate::heap::RegionOracle;
use crate::logging::ScanEvent;
use crate::object::layout::symbol;
use crate::object::tag::{make_fixnum, make_lispobj, native_pointer, PointerTag};
use crate::object::{
    compare_ascii, lowtag_of, widetag_of, LowTag, NameEncoding, NameRef, ObjectSizeOracle, WideTag, Word,
    WORD_BYTES,
};
use std::time::Instant;

/// A symbol found by [`find_symbol_by_name`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    address: usize,
    name_encoding: NameEncoding,
}

impl SymbolRef {
    /// Address of the symbol header
    pub fn address(&self) -> usize {
        self.address
    }

    /// The symbol as a tagged other-pointer
    pub fn tagged(&self) -> Word {
        make_lispobj(self.address, PointerTag::Other)
    }

    /// How the matched name is stored
    pub fn name_encoding(&self) -> NameEncoding {
        self.name_encoding
    }
}

/// Find the first symbol in `[start, end)` named `name`
///
/// `name` is compared as ASCII against narrow names and, when
/// `ScanConfig::unicode` is set, against wide names. A NUL byte inside
/// `name` ends the character comparison early (see
/// [`compare_ascii`](crate::object::compare_ascii)).
///
/// The caller asserts `[start, end)` is a run of whole objects. Reads still
/// go through the region check: a header word outside managed memory ends
/// the walk with None, since its size cannot be known.
pub fn find_symbol_by_name<R, S>(
    ctx: &ScanContext<'_, R, S>,
    name: &[u8],
    start: usize,
    end: usize,
) -> Option<SymbolRef>
where
    R: RegionOracle + ?Sized,
    S: ObjectSizeOracle,
{
    let timer = Instant::now();
    ctx.emit(ScanEvent::ScanStart {
        scanner: "symbol",
        start,
        end: Some(end),
    });

    let namelen = make_fixnum(name.len() as u64);
    let mut cursor = start;
    let mut visited = 0u64;

    let found = loop {
        if cursor >= end {
            break None;
        }

        let Some(header) = ctx.view().load(cursor) else {
            ctx.skip(cursor, "header outside managed memory");
            break None;
        };
        visited += 1;
        ctx.bump(|s| &s.objects_visited);

        if widetag_of(header) == Some(WideTag::Symbol) {
            if let Some(found) = match_symbol(ctx, cursor, name, namelen) {
                break Some(found);
            }
        }

        let mut words = ctx.sizes().object_size_words(ctx.view(), header, cursor);
        if words == 0 {
            log::warn!("zero-sized object at {:#x} (header {:#x})", cursor, header);
            ctx.emit(ScanEvent::ZeroSizedObject {
                address: cursor,
                header,
            });
            words = 1;
        }

        match words.checked_mul(WORD_BYTES).and_then(|bytes| cursor.checked_add(bytes)) {
            Some(next) => cursor = next,
            None => break None,
        }
    };

    log::debug!(
        "symbol search for {:?} in [{:#x}, {:#x}): {:?} after {} objects",
        String::from_utf8_lossy(name),
        start,
        end,
        found.map(|s| s.address),
        visited
    );
    ctx.emit(ScanEvent::ScanEnd {
        scanner: "symbol",
        visited,
        found: found.map(|s| s.address),
        duration_us: timer.elapsed().as_micros() as u64,
    });

    found
}

/// Check one symbol's name against the target
fn match_symbol<R, S>(ctx: &ScanContext<'_, R, S>, address: usize, target: &[u8], namelen: Word) -> Option<SymbolRef>
where
    R: RegionOracle + ?Sized,
    S: ObjectSizeOracle,
{
    ctx.bump(|s| &s.symbols_examined);
    let view = ctx.view();

    let Some(name_word) = view.load_slot(address, symbol::NAME_SLOT) else {
        ctx.skip(address, "name slot outside managed memory");
        return None;
    };
    if lowtag_of(name_word) != LowTag::OtherPointer {
        ctx.skip(address, "name slot is not a pointer");
        return None;
    }
    if !view.is_managed(native_pointer(name_word)) {
        ctx.skip(address, "name points outside managed memory");
        return None;
    }
    let Some(name) = NameRef::decode(view, name_word) else {
        ctx.skip(address, "name is not a string");
        return None;
    };
    if name.encoding() == NameEncoding::Wide && !ctx.config().unicode {
        ctx.skip(address, "wide name without unicode matching");
        return None;
    }
    if name.tagged_length() != namelen {
        ctx.bump(|s| &s.length_rejections);
        ctx.skip(address, "name length differs");
        return None;
    }

    ctx.bump(|s| &s.names_compared);
    if !compare_ascii(&name.chars(view), target) {
        ctx.skip(address, "name differs");
        return None;
    }

    Some(SymbolRef {
        address,
        name_encoding: name.encoding(),
    })
}
