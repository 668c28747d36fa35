//! In-memory host page and image fixtures shared by overlay and session tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::io::Cursor;

use crate::overlay::display::HostPage;
use crate::overlay::geometry::{Size, Viewport};
use crate::services::images::StoredImage;

/// Host that hands out numbered URLs and tracks which are still live.
pub struct RecordingHost {
    pub viewport: Cell<Viewport>,
    pub document: Cell<Size>,
    next: Cell<u32>,
    live: RefCell<BTreeSet<String>>,
    revoked: RefCell<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            viewport: Cell::new(Viewport { scroll_x: 0.0, scroll_y: 0.0, width: 1280.0, height: 800.0 }),
            document: Cell::new(Size::new(1280.0, 4000.0)),
            next: Cell::new(0),
            live: RefCell::new(BTreeSet::new()),
            revoked: RefCell::new(Vec::new()),
        }
    }

    pub fn live_urls(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.borrow().clone()
    }
}

impl HostPage for RecordingHost {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn document_size(&self) -> Size {
        self.document.get()
    }

    fn create_object_url(&self, _content: &[u8], _mime_type: &str) -> String {
        let n = self.next.get() + 1;
        self.next.set(n);
        let url = format!("blob:test/{n}");
        self.live.borrow_mut().insert(url.clone());
        url
    }

    fn revoke_object_url(&self, url: &str) {
        assert!(self.live.borrow_mut().remove(url), "revoked unknown or already revoked url {url}");
        self.revoked.borrow_mut().push(url.to_string());
    }
}

/// Encoded PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}

pub fn stored_png(id: &str, width: u32, height: u32) -> StoredImage {
    StoredImage { id: id.to_string(), content: png(width, height), mime_type: "image/png".into(), created_at: 1 }
}
