//! The seams between the rig and its environment.
//!
//! [`DomHost`] is everything the rig reads from or writes to the page;
//! [`TextureLoader`] turns a media element into a texture handle right away
//! and resolves it in place later. The web crate implements both over
//! `web-sys` and `wgpu`; tests use in-memory fakes.

use glam::Vec2;

use crate::geometry::PixelBox;
use crate::scene::TextureId;

/// Stable address of a scene item across frames.
///
/// The generation changes on every rebuild, so an event aimed at a torn-down
/// item never lands on its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub index: u32,
    pub generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Enter,
    Leave,
    Move,
}

/// A pointer event already translated into element-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub key: ItemKey,
    pub kind: PointerKind,
    pub local: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

pub trait DomHost {
    /// A tagged element.
    type Element: Clone;
    /// The primary image or video inside a tagged element.
    type Media: Clone;
    /// Whatever must be kept to remove a listener again.
    type Listener;

    /// Pixel box of the container the overlay covers, `None` when the
    /// container is missing or detached.
    fn container_box(&self) -> Option<PixelBox>;

    /// All elements currently matching `selector`, in DOM order.
    fn query_items(&self, selector: &str) -> Vec<Self::Element>;

    /// First image, else first video, inside `element`.
    fn resolve_media(&self, element: &Self::Element) -> Option<(Self::Media, MediaKind)>;

    /// Current viewport box of `element`.
    fn bounding_box(&self, element: &Self::Element) -> Option<PixelBox>;

    /// The element's current transform, as computed style reports it
    /// (`matrix(..)` or `none`) or as written inline.
    fn transform(&self, element: &Self::Element) -> Option<String>;

    /// Corner radius declared on the media element, in CSS px.
    fn border_radius(&self, media: &Self::Media) -> Option<f32>;

    /// Set (or with `None`, restore) the visibility of the original media.
    fn set_media_opacity(&mut self, media: &Self::Media, opacity: Option<f32>);

    /// Register enter/leave/move listeners on `media` that report events for
    /// `key`, local to `element`'s box.
    fn attach_listeners(&mut self, element: &Self::Element, media: &Self::Media, key: ItemKey) -> Vec<Self::Listener>;

    fn detach_listener(&mut self, media: &Self::Media, listener: Self::Listener);

    /// Pointer events received since the last call, oldest first.
    fn drain_pointer_events(&mut self) -> Vec<PointerEvent>;

    /// Smoothed vertical scroll offset, read once per frame.
    fn scroll_offset(&self) -> f32;
}

pub trait TextureLoader<M> {
    /// Return a handle immediately; the texture may still be a placeholder.
    fn load(&mut self, media: &M, kind: MediaKind) -> TextureId;

    fn release(&mut self, texture: TextureId);
}
