//! ICC profile container
//!
//! The header and tag table are decoded eagerly. Tag payloads are decoded
//! on first access, and directory entries that point at the same
//! `{type, offset, size}` share a single decoded instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::path::Path;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use super::error::IccError;
use super::header::{
    ColorSpace, HEADER_SIZE, ID_ZEROED_RANGES, IccHeader, ProfileClass, VersionClass,
};
use super::io::{IccFile, Md5File, MemFile, StdFile};
use super::legality::{check_legal, check_required};
use super::options::IccOptions;
use super::primitives::ByteWriter;
use super::tags::{S15Fixed16Array, Tag, TagContext, Unknown, XyzArray, read_tag_bytes};
use super::types::{TagSignature, TypeSignature, XyzNumber};
use crate::color::{D50, Xyz};
use crate::math::{ChromaticAdaptationMethod, Matrix3x3, adaptation_matrix_with_cone};
use crate::sat::{sat_add, sat_align, sat_mul, SatArith};

/// Shared, mutable handle to a decoded tag.
pub type TagHandle = Rc<RefCell<Tag>>;

const TAG_ENTRY_SIZE: u32 = 12;
const TAG_ALIGN: u32 = 4;

/// Result of probing the tag table without loading anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPresence {
    /// Present with a type this library decodes
    Known(TypeSignature),
    /// Present with a type that only loads as [`Unknown`]
    Unknown(TypeSignature),
    Absent,
}

#[derive(Debug, Clone)]
struct TagEntry {
    sig: TagSignature,
    ttype: TypeSignature,
    /// Offset and size in the backing file
    origin: Option<(u32, u32)>,
    tag: Option<TagHandle>,
}

/// Offsets assigned by the layout pass.
struct Layout {
    table: Vec<(TagSignature, u32, u32)>,
    blobs: Vec<(u32, u32, TagHandle)>,
    total: u32,
}

/// An ICC profile: header, tag directory and lazily decoded tags.
pub struct IccProfile {
    pub header: IccHeader,
    options: IccOptions,
    entries: Vec<TagEntry>,
    /// Directory position of each signature
    index: HashMap<TagSignature, usize>,
    links: HashMap<(TypeSignature, u32, u32), Weak<RefCell<Tag>>>,
    file: Option<Box<dyn IccFile>>,
    media_white: Option<Xyz>,
}

impl fmt::Debug for IccProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IccProfile")
            .field("header", &self.header)
            .field("options", &self.options)
            .field("entries", &self.entries)
            .field("file_backed", &self.file.is_some())
            .field("media_white", &self.media_white)
            .finish()
    }
}

impl IccProfile {
    /// Empty profile for a building application.
    pub fn new(device_class: ProfileClass, color_space: ColorSpace, pcs: ColorSpace) -> Self {
        Self {
            header: IccHeader::new(device_class, color_space, pcs),
            options: IccOptions::default(),
            entries: Vec::new(),
            index: HashMap::new(),
            links: HashMap::new(),
            file: None,
            media_white: None,
        }
    }

    pub fn with_options(mut self, options: IccOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &IccOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut IccOptions {
        &mut self.options
    }

    /// Encoding context handed to tag codecs.
    pub fn context(&self) -> TagContext {
        TagContext::from_header(&self.header, self.options.strict_datetime)
    }

    /// Decode the header and tag table of `file`. Tag payloads stay on disk
    /// until [`read_tag`](Self::read_tag).
    pub fn read(mut file: Box<dyn IccFile>, options: IccOptions) -> Result<Self, IccError> {
        let file_size = file.get_size()?;
        let mut hbuf = [0u8; HEADER_SIZE];
        file.read_exact_at(0, &mut hbuf)?;
        let header = IccHeader::read(&hbuf, options.strict_datetime)?;

        let min_size = HEADER_SIZE as u32 + 4;
        if u64::from(header.size) > file_size || header.size < min_size {
            return Err(IccError::SizeMismatch {
                header_size: header.size,
                actual_size: file_size,
            });
        }

        let mut cbuf = [0u8; 4];
        file.read_exact_at(HEADER_SIZE as u64, &mut cbuf)?;
        let count = u32::from_be_bytes(cbuf);
        let table_len = sat_mul(count, TAG_ENTRY_SIZE);
        let table_end = sat_add(min_size, table_len);
        if table_end > header.size {
            return Err(IccError::TooSmall {
                expected: table_end as usize,
                actual: header.size as usize,
            });
        }

        let table = read_tag_bytes(file.as_mut(), table_len, min_size)?;
        let mut entries: Vec<TagEntry> = Vec::new();
        let mut index: HashMap<TagSignature, usize> = HashMap::new();
        entries
            .try_reserve_exact(count as usize)
            .and_then(|_| index.try_reserve(count as usize))
            .map_err(|_| IccError::Allocation {
                bytes: table_len as usize,
            })?;
        for raw in table.chunks_exact(TAG_ENTRY_SIZE as usize) {
            let word = |i: usize| u32::from_be_bytes([raw[i], raw[i + 1], raw[i + 2], raw[i + 3]]);
            let (sig, offset, size) = (TagSignature(word(0)), word(4), word(8));
            if offset < table_end || sat_add(offset, size) > header.size {
                return Err(IccError::TagOutOfBounds {
                    tag: sig.0,
                    offset,
                    size,
                    profile_size: header.size,
                });
            }
            if size < 8 {
                return Err(IccError::TooSmall {
                    expected: 8,
                    actual: size as usize,
                });
            }
            if index.insert(sig, entries.len()).is_some() {
                return Err(IccError::DuplicateTag(sig.0));
            }
            let mut tbuf = [0u8; 4];
            file.read_exact_at(u64::from(offset), &mut tbuf)?;
            entries.push(TagEntry {
                sig,
                ttype: TypeSignature(u32::from_be_bytes(tbuf)),
                origin: Some((offset, size)),
                tag: None,
            });
        }
        debug!(
            "read profile directory: {} tags in {} bytes",
            entries.len(),
            header.size
        );

        Ok(Self {
            header,
            options,
            entries,
            index,
            links: HashMap::new(),
            file: Some(file),
            media_white: None,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, IccError> {
        Self::from_bytes_with(data, IccOptions::default())
    }

    pub fn from_bytes_with(data: &[u8], options: IccOptions) -> Result<Self, IccError> {
        Self::read(Box::new(MemFile::from_bytes(data.to_vec())), options)
    }

    /// Open a profile on disk. The file stays open for lazy tag reads.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::read(
            Box::new(StdFile::new(file)),
            IccOptions::default(),
        )?)
    }

    fn index_of(&self, sig: TagSignature) -> Option<usize> {
        self.index.get(&sig).copied()
    }

    fn push_entry(&mut self, entry: TagEntry) {
        self.index.insert(entry.sig, self.entries.len());
        self.entries.push(entry);
    }

    fn index_or_missing(&self, sig: TagSignature) -> Result<usize, IccError> {
        self.index_of(sig).ok_or(IccError::TagNotFound(sig.0))
    }

    /// Probe the tag table. Never loads the payload.
    pub fn find_tag(&self, sig: TagSignature) -> TagPresence {
        match self.index_of(sig) {
            None => TagPresence::Absent,
            Some(i) => {
                let ttype = self.entries[i].ttype;
                if Tag::new_for_type(ttype).is_some() {
                    TagPresence::Known(ttype)
                } else {
                    TagPresence::Unknown(ttype)
                }
            }
        }
    }

    pub fn has_tag(&self, sig: TagSignature) -> bool {
        self.index_of(sig).is_some()
    }

    /// Signatures in directory order.
    pub fn signatures(&self) -> Vec<TagSignature> {
        self.entries.iter().map(|e| e.sig).collect()
    }

    pub fn tag_count(&self) -> usize {
        self.entries.len()
    }

    /// Load (or return the already loaded) tag for `sig`.
    pub fn read_tag(&mut self, sig: TagSignature) -> Result<TagHandle, IccError> {
        let idx = self.index_or_missing(sig)?;
        if let Some(handle) = &self.entries[idx].tag {
            return Ok(handle.clone());
        }
        let ttype = self.entries[idx].ttype;
        let (offset, size) = self.entries[idx]
            .origin
            .ok_or(IccError::TagNotFound(sig.0))?;

        let key = (ttype, offset, size);
        if let Some(handle) = self.links.get(&key).and_then(Weak::upgrade) {
            debug!("'{}' shares the '{}' tag already loaded at {}", sig, ttype, offset);
            self.entries[idx].tag = Some(handle.clone());
            return Ok(handle);
        }

        let mut tag = match Tag::new_for_type(ttype) {
            Some(tag) => tag,
            None if self.options.allow_unknown => {
                warn!("'{}' has unrecognized type '{}', keeping it opaque", sig, ttype);
                Unknown::default().into()
            }
            None => {
                return Err(IccError::UnknownTagType {
                    tag: sig.0,
                    type_sig: ttype.0,
                });
            }
        };
        let ctx = self.context();
        let file = self
            .file
            .as_deref_mut()
            .ok_or(IccError::TagNotFound(sig.0))?;
        tag.read(file, size, offset, &ctx)?;
        debug!("loaded '{}' ('{}'), {} bytes at {}", sig, ttype, size, offset);

        let handle = Rc::new(RefCell::new(tag));
        self.links.insert(key, Rc::downgrade(&handle));
        self.entries[idx].tag = Some(handle.clone());
        Ok(handle)
    }

    /// Load every tag in the directory.
    pub fn read_all_tags(&mut self) -> Result<(), IccError> {
        for sig in self.signatures() {
            self.read_tag(sig)?;
        }
        Ok(())
    }

    fn register(&mut self, sig: TagSignature, tag: Tag) -> TagHandle {
        let handle = Rc::new(RefCell::new(tag));
        let ttype = handle.borrow().type_signature();
        self.push_entry(TagEntry {
            sig,
            ttype,
            origin: None,
            tag: Some(handle.clone()),
        });
        handle
    }

    /// Add an empty tag of type `ttype` under `sig`.
    pub fn add_tag(&mut self, sig: TagSignature, ttype: TypeSignature) -> Result<TagHandle, IccError> {
        if self.has_tag(sig) {
            return Err(IccError::DuplicateTag(sig.0));
        }
        check_legal(sig, ttype)?;
        let tag = match Tag::new_for_type(ttype) {
            Some(tag) => tag,
            None if self.options.allow_unknown => Unknown {
                uttype: ttype,
                data: vec![0; 4],
            }
            .into(),
            None => {
                return Err(IccError::UnknownTagType {
                    tag: sig.0,
                    type_sig: ttype.0,
                });
            }
        };
        Ok(self.register(sig, tag))
    }

    /// Add an already populated tag under `sig`.
    pub fn add_tag_value(&mut self, sig: TagSignature, tag: impl Into<Tag>) -> Result<TagHandle, IccError> {
        if self.has_tag(sig) {
            return Err(IccError::DuplicateTag(sig.0));
        }
        let tag = tag.into();
        check_legal(sig, tag.type_signature())?;
        Ok(self.register(sig, tag))
    }

    /// Store `tag` under `sig`, replacing any existing entry's instance.
    fn put_tag(&mut self, sig: TagSignature, tag: Tag) -> Result<(), IccError> {
        check_legal(sig, tag.type_signature())?;
        match self.index_of(sig) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                entry.ttype = tag.type_signature();
                entry.origin = None;
                entry.tag = Some(Rc::new(RefCell::new(tag)));
            }
            None => {
                self.register(sig, tag);
            }
        }
        Ok(())
    }

    /// Register `sig` as a second name for the tag stored under `existing`.
    pub fn link_tag(&mut self, sig: TagSignature, existing: TagSignature) -> Result<TagHandle, IccError> {
        if self.has_tag(sig) {
            return Err(IccError::DuplicateTag(sig.0));
        }
        let handle = self.read_tag(existing)?;
        let ttype = handle.borrow().type_signature();
        check_legal(sig, ttype)?;
        let origin = self.entries[self.index_or_missing(existing)?].origin;
        debug!("linked '{}' to '{}'", sig, existing);
        self.push_entry(TagEntry {
            sig,
            ttype,
            origin,
            tag: Some(handle.clone()),
        });
        Ok(handle)
    }

    pub fn rename_tag(&mut self, old: TagSignature, new: TagSignature) -> Result<(), IccError> {
        let idx = self.index_or_missing(old)?;
        if old == new {
            return Ok(());
        }
        if self.has_tag(new) {
            return Err(IccError::DuplicateTag(new.0));
        }
        check_legal(new, self.entries[idx].ttype)?;
        self.entries[idx].sig = new;
        self.index.remove(&old);
        self.index.insert(new, idx);
        Ok(())
    }

    /// Release this entry's share of its tag. The entry stays in the
    /// directory and reloads from the file on next access.
    pub fn unload_tag(&mut self, sig: TagSignature) -> Result<(), IccError> {
        let idx = self.index_or_missing(sig)?;
        if self.entries[idx].origin.is_none() || self.file.is_none() {
            return Err(IccError::Unsupported(format!(
                "'{}' has no file backing to reload from",
                sig
            )));
        }
        self.entries[idx].tag = None;
        Ok(())
    }

    /// Remove `sig` from the directory, freeing the tag if no other entry
    /// shares it.
    pub fn delete_tag(&mut self, sig: TagSignature) -> Result<(), IccError> {
        let idx = self.index_or_missing(sig)?;
        self.entries.remove(idx);
        self.index.remove(&sig);
        for (i, entry) in self.entries.iter().enumerate().skip(idx) {
            self.index.insert(entry.sig, i);
        }
        Ok(())
    }

    /// Number of directory entries sharing the instance loaded for `sig`.
    pub fn tag_ref_count(&self, sig: TagSignature) -> Option<usize> {
        let handle = self.entries.get(self.index_of(sig)?)?.tag.as_ref()?;
        Some(
            self.entries
                .iter()
                .filter(|e| e.tag.as_ref().is_some_and(|t| Rc::ptr_eq(t, handle)))
                .count(),
        )
    }

    /// Record the real media white used for the automatic `wtpt`, `chad`
    /// and `arts` tags.
    pub fn set_media_white(&mut self, white: Xyz) {
        self.media_white = Some(white);
    }

    fn xyz_tag(&mut self, sig: TagSignature) -> Result<Option<Xyz>, IccError> {
        if !self.has_tag(sig) {
            return Ok(None);
        }
        let handle = self.read_tag(sig)?;
        let value = handle.borrow().xyz_value();
        value
            .map(XyzNumber::to_xyz)
            .map(Some)
            .ok_or(IccError::CorruptedData(format!("'{}' holds no XYZ value", sig)))
    }

    fn matrix_tag(&mut self, sig: TagSignature) -> Result<Option<Matrix3x3>, IccError> {
        if !self.has_tag(sig) {
            return Ok(None);
        }
        let handle = self.read_tag(sig)?;
        let m = handle.borrow().as_s15f16_array().and_then(S15Fixed16Array::to_matrix);
        m.map(Some)
            .ok_or(IccError::CorruptedData(format!("'{}' is not a 3x3 matrix", sig)))
    }

    /// Real media white point. Display profiles storing `wtpt = D50` with a
    /// `chad` are mapped back through the inverse adaptation.
    pub fn media_white(&mut self) -> Result<Xyz, IccError> {
        if let Some(white) = self.media_white {
            return Ok(white);
        }
        let wtpt = self.xyz_tag(TagSignature::MEDIA_WHITE)?.unwrap_or(D50.xyz);
        if self.header.device_class == ProfileClass::Display {
            if let Some(chad) = self.matrix_tag(TagSignature::CHAD)? {
                let inv = chad.inverse().ok_or(IccError::SingularMatrix)?;
                return Ok(Xyz::from_array(inv.multiply_vec(wtpt.to_array())));
            }
        }
        Ok(wtpt)
    }

    /// Media black point, when recorded.
    pub fn media_black(&mut self) -> Result<Option<Xyz>, IccError> {
        self.xyz_tag(TagSignature::MEDIA_BLACK)
    }

    /// Cone matrix for absolute/relative conversion: the recorded `arts`
    /// tag, else the default for this device class.
    pub fn abs_cone(&mut self) -> Result<Matrix3x3, IccError> {
        match self.matrix_tag(TagSignature::ABS_TO_REL)? {
            Some(m) => Ok(m),
            None => Ok(self.options.cone_method(self.header.device_class).cone_matrix()),
        }
    }

    fn set_auto_tags(&mut self) -> Result<(), IccError> {
        let Some(white) = self.media_white else {
            return Ok(());
        };
        let class = self.header.device_class;
        if class == ProfileClass::DeviceLink {
            return Ok(());
        }
        if class == ProfileClass::Display && self.options.display_chad_d50 {
            let chad = adaptation_matrix_with_cone(
                white,
                D50.xyz,
                &ChromaticAdaptationMethod::Bradford.cone_matrix(),
            );
            self.put_tag(TagSignature::MEDIA_WHITE, XyzArray::single(D50.xyz.into()).into())?;
            self.put_tag(TagSignature::CHAD, S15Fixed16Array::from_matrix(&chad).into())?;
        } else {
            self.put_tag(TagSignature::MEDIA_WHITE, XyzArray::single(white.into()).into())?;
        }
        let cone = self.options.cone_method(class).cone_matrix();
        self.put_tag(TagSignature::ABS_TO_REL, S15Fixed16Array::from_matrix(&cone).into())?;
        Ok(())
    }

    fn layout(&self, ctx: &TagContext) -> Result<Layout, IccError> {
        let count = u32::try_from(self.entries.len()).map_err(|_| IccError::TooLarge("tag table"))?;
        let mut cur = sat_align(
            TAG_ALIGN,
            sat_add(HEADER_SIZE as u32 + 4, sat_mul(count, TAG_ENTRY_SIZE)),
        );
        let mut table = Vec::with_capacity(self.entries.len());
        let mut blobs: Vec<(u32, u32, TagHandle)> = Vec::new();
        for entry in &self.entries {
            let handle = entry.tag.as_ref().ok_or(IccError::TagNotFound(entry.sig.0))?;
            if let Some(&(offset, size, _)) = blobs.iter().find(|b| Rc::ptr_eq(&b.2, handle)) {
                table.push((entry.sig, offset, size));
                continue;
            }
            let size = handle.borrow().get_size(ctx);
            if size.is_saturated() {
                return Err(IccError::TooLarge("tag payload"));
            }
            table.push((entry.sig, cur, size));
            blobs.push((cur, size, handle.clone()));
            cur = sat_align(TAG_ALIGN, sat_add(cur, size));
            if cur.is_saturated() {
                return Err(IccError::TooLarge("profile"));
            }
        }
        debug!("laid out {} tags ({} distinct) in {} bytes", table.len(), blobs.len(), cur);
        Ok(Layout {
            table,
            blobs,
            total: cur,
        })
    }

    fn write_body(
        file: &mut dyn IccFile,
        header: &[u8],
        layout: &Layout,
        ctx: &TagContext,
    ) -> Result<(), IccError> {
        file.seek(0)?;
        file.write(header)?;

        let mut w = ByteWriter::with_capacity(4 + layout.table.len() * TAG_ENTRY_SIZE as usize)?;
        w.count32("tag count", layout.table.len())?;
        for &(sig, offset, size) in &layout.table {
            w.u32(sig.0);
            w.u32(offset);
            w.u32(size);
        }
        file.write(w.as_bytes())?;

        const PAD: [u8; TAG_ALIGN as usize] = [0; TAG_ALIGN as usize];
        for (offset, size, handle) in &layout.blobs {
            let written = handle.borrow().write(file, *offset, ctx)?;
            if written != *size {
                return Err(IccError::CorruptedData(format!(
                    "tag at {} wrote {} bytes, sized {}",
                    offset, written, size
                )));
            }
            let end = offset + size;
            let pad = (sat_align(TAG_ALIGN, end) - end) as usize;
            file.write(&PAD[..pad])?;
        }
        Ok(())
    }

    /// Write the complete profile to `file`, returning its size.
    ///
    /// All tags are loaded first, automatic tags are refreshed and the tag
    /// set is validated. `header.size` and `header.profile_id` are updated.
    pub fn write(&mut self, file: &mut dyn IccFile) -> Result<u32, IccError> {
        self.read_all_tags()?;
        self.set_auto_tags()?;
        for entry in &self.entries {
            if let Some(handle) = &entry.tag {
                check_legal(entry.sig, handle.borrow().type_signature())?;
            }
        }
        if self.options.check_required_tags {
            check_required(&self.header, |s| self.has_tag(s))?;
        } else {
            warn!("required tag check skipped for {:?} profile", self.header.device_class);
        }

        let ctx = self.context();
        let layout = self.layout(&ctx)?;
        self.header.size = layout.total;
        self.header.profile_id = [0; 16];

        if self.options.compute_id && self.header.version.class() >= VersionClass::V4_1 {
            let mut hdr = self.header.write()?;
            for range in ID_ZEROED_RANGES {
                hdr[range].fill(0);
            }
            let mut sink = Md5File::new();
            Self::write_body(&mut sink, &hdr, &layout, &ctx)?;
            self.header.profile_id = sink.finalize();
        }

        let hdr = self.header.write()?;
        Self::write_body(file, &hdr, &layout, &ctx)?;
        file.flush()?;
        debug!("wrote {:?} profile, {} bytes", self.header.device_class, layout.total);
        Ok(layout.total)
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, IccError> {
        let mut file = MemFile::new();
        self.write(&mut file)?;
        Ok(file.into_bytes())
    }

    /// Write to a new file at `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> crate::Result<u32> {
        let mut file = StdFile::new(File::create(path)?);
        Ok(self.write(&mut file)?)
    }

    /// Dump the header, the tag table and each loaded tag.
    pub fn dump(&self, out: &mut dyn fmt::Write, verbose: u32) {
        if verbose == 0 {
            return;
        }
        self.header.dump(out, verbose);
        let _ = writeln!(out, "Tag table: {} entries", self.entries.len());
        for entry in &self.entries {
            let location = match entry.origin {
                Some((offset, size)) => format!("{} bytes at {}", size, offset),
                None => "in memory".to_string(),
            };
            let _ = writeln!(out, "  '{}' '{}' {}", entry.sig, entry.ttype, location);
        }
        if verbose < 2 {
            return;
        }
        for entry in &self.entries {
            if let Some(handle) = &entry.tag {
                let _ = writeln!(out, "'{}':", entry.sig);
                handle.borrow().dump(out, verbose);
            }
        }
    }
}
