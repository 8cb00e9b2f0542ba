//! Append-only marker log for the currently loaded image.

use std::fmt;
use std::sync::Arc;

use crate::catalog::ClassCatalog;
use crate::coords::ImagePoint;
use crate::error::Result;
use crate::tally::Tally;

/// A class-tagged point, anchored in image-pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub position: ImagePoint,
    pub class_index: usize,
    pub color: [u8; 3],
}

/// Change notifications sent to store listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    Reset,
    Added { index: usize },
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

pub struct MarkerStore {
    catalog: Arc<ClassCatalog>,
    markers: Vec<Marker>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for MarkerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerStore")
            .field("markers", &self.markers)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MarkerStore {
    pub fn new(catalog: Arc<ClassCatalog>) -> Self {
        Self {
            catalog,
            markers: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<ClassCatalog> {
        &self.catalog
    }

    /// Registers a listener called after every reset and every addition.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Drops every marker at once.
    pub fn reset(&mut self) {
        self.markers.clear();
        self.notify(StoreEvent::Reset);
    }

    /// Appends a marker and returns its index.
    pub fn add(&mut self, position: ImagePoint, class_index: usize) -> Result<usize> {
        let class = self.catalog.check_index(class_index)?;
        let marker = Marker {
            position,
            class_index,
            color: class.rgb,
        };
        self.markers.push(marker);
        let index = self.markers.len() - 1;
        log::debug!(
            "marker {index} ({}) at ({:.1}, {:.1})",
            class.name,
            position.x,
            position.y
        );
        self.notify(StoreEvent::Added { index });
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    /// Markers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn tally(&self) -> Tally {
        let mut counts = vec![0usize; self.catalog.len()];
        for marker in &self.markers {
            if let Some(slot) = counts.get_mut(marker.class_index) {
                *slot += 1;
            }
        }
        Tally::from_counts(
            self.catalog
                .iter()
                .zip(counts)
                .map(|(class, n)| (class.name.as_str(), n)),
        )
    }

    /// Copies the current markers. Later additions do not show up in the copy.
    pub fn snapshot(&self) -> MarkerSnapshot {
        MarkerSnapshot {
            markers: self.markers.clone(),
            tally: self.tally(),
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

/// Frozen copy of the store, taken when an export starts.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSnapshot {
    markers: Vec<Marker>,
    tally: Tally,
}

impl MarkerSnapshot {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
