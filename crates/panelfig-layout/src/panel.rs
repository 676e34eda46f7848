//! Panel tree: a canvas partitioned into leaf panels and separators.
//!
//! The tree is stored as an arena keyed by [`PanelId`] with explicit parent
//! pointers. It focuses on:
//!
//! - A closed node model: every node is a [`PanelKind::Leaf`] or a
//!   [`PanelKind::Separator`] owning an ordered list of at least two children.
//! - Exact integer geometry: a separator's children tile its region along its
//!   axis with `thickness`-pixel gaps and span it fully across.
//! - Three structural operations (split, remove, resize) applied atomically
//!   through [`PanelTree::apply_operation`].
//! - Deterministic identifiers and a structural hash for operation logs.
//!
//! Pixel buffers are carried by leaves but never interpreted here. A buffer
//! whose dimensions no longer match its leaf's region is reported as
//! [`BufferState::Stale`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use panelfig_core::{Point, RasterBuffer, Rect};
use serde::{Deserialize, Serialize};

use crate::data_source::DataSource;

/// Current panel tree schema version.
pub const PANEL_TREE_SCHEMA_VERSION: u16 = 1;

/// Default gap between sibling panels, in canvas pixels.
pub const DEFAULT_SEPARATOR_THICKNESS: u32 = 2;

/// Default resize floor for a leaf, in canvas pixels.
pub const DEFAULT_MIN_PANEL_EXTENT: u32 = 8;

/// Stable identifier for panel nodes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(u64);

impl PanelId {
    /// Lowest valid panel ID.
    pub const MIN: Self = Self(1);

    /// Create a new panel ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, PanelModelError> {
        if raw == 0 {
            return Err(PanelModelError::ZeroPanelId);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, PanelModelError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(PanelModelError::PanelIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl Default for PanelId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction along which a separator lays out its children.
///
/// `Horizontal` places children left to right (it divides the width);
/// `Vertical` stacks them top to bottom (it divides the height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

impl SplitAxis {
    /// Size of `rect` along this axis.
    #[inline]
    #[must_use]
    pub const fn extent(self, rect: Rect) -> u32 {
        match self {
            Self::Horizontal => rect.width,
            Self::Vertical => rect.height,
        }
    }

    /// Leading coordinate of `rect` along this axis.
    #[inline]
    #[must_use]
    pub const fn start(self, rect: Rect) -> u32 {
        match self {
            Self::Horizontal => rect.x,
            Self::Vertical => rect.y,
        }
    }

    /// Trailing (exclusive) coordinate of `rect` along this axis.
    #[inline]
    #[must_use]
    pub const fn end(self, rect: Rect) -> u32 {
        match self {
            Self::Horizontal => rect.right(),
            Self::Vertical => rect.bottom(),
        }
    }

    /// `rect` with its span along this axis replaced.
    #[inline]
    #[must_use]
    pub const fn with_span(self, rect: Rect, start: u32, extent: u32) -> Rect {
        match self {
            Self::Horizontal => Rect::new(start, rect.y, extent, rect.height),
            Self::Vertical => Rect::new(rect.x, start, rect.width, extent),
        }
    }

    #[inline]
    #[must_use]
    pub fn coordinate(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    #[must_use]
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Gap and color given to separators created by future splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorStyle {
    pub thickness: u32,
    pub color: Rgb,
}

impl Default for SeparatorStyle {
    fn default() -> Self {
        Self {
            thickness: DEFAULT_SEPARATOR_THICKNESS,
            color: Rgb::WHITE,
        }
    }
}

/// Text label drawn over a leaf by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelState {
    pub text: String,
    pub font_size: u32,
    pub color: Rgb,
}

impl LabelState {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 12,
            color: Rgb::WHITE,
        }
    }
}

/// Scale bar drawn over a leaf by the host; `length` is in calibrated units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalebarState {
    pub length: f64,
    pub thickness: u32,
    pub color: Rgb,
    pub show_text: bool,
}

/// Content-bearing panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeafPanel {
    #[serde(default)]
    pub data: DataSource,
    /// Filled pixels; never serialized, rebuilt from `data` on load.
    #[serde(skip)]
    pub pixels: Option<Arc<RasterBuffer>>,
    #[serde(default)]
    pub label: Option<LabelState>,
    #[serde(default)]
    pub scalebar: Option<ScalebarState>,
}

impl LeafPanel {
    /// Buffer validity against a region of the given size.
    #[must_use]
    pub fn buffer_state(&self, region: Rect) -> BufferState {
        match &self.pixels {
            None => BufferState::Empty,
            Some(buffer) if buffer.matches_size(region.width, region.height) => BufferState::Valid,
            Some(_) => BufferState::Stale,
        }
    }
}

/// Structural panel owning its children in layout order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparatorPanel {
    pub axis: SplitAxis,
    pub thickness: u32,
    pub color: Rgb,
    pub children: Vec<PanelId>,
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelKind {
    Leaf(LeafPanel),
    Separator(SeparatorPanel),
}

/// One node of the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelNode {
    pub id: PanelId,
    #[serde(default)]
    pub parent: Option<PanelId>,
    pub region: Rect,
    #[serde(flatten)]
    pub kind: PanelKind,
}

impl PanelNode {
    #[must_use]
    pub fn leaf(id: PanelId, parent: Option<PanelId>, region: Rect, leaf: LeafPanel) -> Self {
        Self {
            id,
            parent,
            region,
            kind: PanelKind::Leaf(leaf),
        }
    }

    #[must_use]
    pub fn separator(
        id: PanelId,
        parent: Option<PanelId>,
        region: Rect,
        separator: SeparatorPanel,
    ) -> Self {
        Self {
            id,
            parent,
            region,
            kind: PanelKind::Separator(separator),
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, PanelKind::Leaf(_))
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafPanel> {
        match &self.kind {
            PanelKind::Leaf(leaf) => Some(leaf),
            PanelKind::Separator(_) => None,
        }
    }

    #[must_use]
    pub fn as_separator(&self) -> Option<&SeparatorPanel> {
        match &self.kind {
            PanelKind::Separator(separator) => Some(separator),
            PanelKind::Leaf(_) => None,
        }
    }
}

/// Whether a leaf's pixels can be shown as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferState {
    /// No buffer.
    Empty,
    /// Buffer matches the region size.
    Valid,
    /// Buffer no longer matches the region size; re-fill or clear.
    Stale,
}

/// Serialized tree shape. Pixel buffers are not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelTreeSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub root: PanelId,
    pub next_id: PanelId,
    #[serde(default)]
    pub style: SeparatorStyle,
    #[serde(default = "default_min_extent")]
    pub min_extent: u32,
    pub nodes: Vec<PanelNode>,
}

fn default_schema_version() -> u16 {
    PANEL_TREE_SCHEMA_VERSION
}

fn default_min_extent() -> u32 {
    DEFAULT_MIN_PANEL_EXTENT
}

impl PanelTreeSnapshot {
    /// Sort nodes by ID for deterministic serialization.
    pub fn canonicalize(&mut self) {
        self.nodes.sort_by_key(|node| node.id);
    }
}

/// Supported structural operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PanelOperation {
    /// Replace a leaf with a separator owning `count` new empty leaves.
    Split {
        target: PanelId,
        axis: SplitAxis,
        count: u32,
    },
    /// Delete a non-root node (leaf or subtree) and give its space to the
    /// remaining siblings.
    Remove { target: PanelId },
    /// Move the boundary after child `index` of `separator` to `boundary`, the
    /// canvas coordinate where that child should end. Out-of-range requests
    /// are clamped.
    ResizeBoundary {
        separator: PanelId,
        index: usize,
        boundary: i64,
    },
}

impl PanelOperation {
    /// Operation family.
    #[must_use]
    pub const fn kind(&self) -> PanelOperationKind {
        match self {
            Self::Split { .. } => PanelOperationKind::Split,
            Self::Remove { .. } => PanelOperationKind::Remove,
            Self::ResizeBoundary { .. } => PanelOperationKind::ResizeBoundary,
        }
    }

    #[must_use]
    fn referenced_nodes(&self) -> Vec<PanelId> {
        match self {
            Self::Split { target, .. } | Self::Remove { target } => vec![*target],
            Self::ResizeBoundary { separator, .. } => vec![*separator],
        }
    }
}

/// Stable operation discriminator used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelOperationKind {
    Split,
    Remove,
    ResizeBoundary,
}

/// Successful operation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOperationOutcome {
    pub operation_id: u64,
    pub kind: PanelOperationKind,
    pub touched_nodes: Vec<PanelId>,
    /// New nodes in allocation order; for a split, the separator first.
    pub created_nodes: Vec<PanelId>,
    pub removed_nodes: Vec<PanelId>,
    /// Leaves whose buffer became stale because their region was resized.
    pub stale_leaves: Vec<PanelId>,
    /// Boundary actually applied by a resize after clamping.
    pub applied_boundary: Option<u32>,
    pub before_hash: u64,
    pub after_hash: u64,
}

/// Failure payload; the tree is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOperationError {
    pub operation_id: u64,
    pub kind: PanelOperationKind,
    pub touched_nodes: Vec<PanelId>,
    pub before_hash: u64,
    pub after_hash: u64,
    pub reason: PanelOperationFailure,
}

/// Structured reasons for operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOperationFailure {
    MissingNode {
        node_id: PanelId,
    },
    NodeNotLeaf {
        node_id: PanelId,
    },
    NodeNotSeparator {
        node_id: PanelId,
    },
    CannotRemoveRoot {
        node_id: PanelId,
    },
    InvalidSplit {
        node_id: PanelId,
        count: u32,
        extent: u32,
        thickness: u32,
    },
    ChildIndexOutOfRange {
        node_id: PanelId,
        index: usize,
        children: usize,
    },
    PanelIdOverflow {
        current: PanelId,
    },
    Validation(PanelModelError),
}

impl fmt::Display for PanelOperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode { node_id } => write!(f, "node {node_id} not found"),
            Self::NodeNotLeaf { node_id } => write!(f, "node {node_id} is not a leaf"),
            Self::NodeNotSeparator { node_id } => {
                write!(f, "node {node_id} is not a separator")
            }
            Self::CannotRemoveRoot { node_id } => {
                write!(f, "cannot remove root node {node_id}")
            }
            Self::InvalidSplit {
                node_id,
                count,
                extent,
                thickness,
            } => write!(
                f,
                "cannot split node {node_id} into {count} panels: extent {extent} with {thickness}px gaps leaves a child without pixels"
            ),
            Self::ChildIndexOutOfRange {
                node_id,
                index,
                children,
            } => write!(
                f,
                "separator {node_id} has no boundary after child {index} ({children} children)"
            ),
            Self::PanelIdOverflow { current } => {
                write!(f, "panel id overflow after {current}")
            }
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PanelOperationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Validation(err) = self {
            return Some(err);
        }
        None
    }
}

impl fmt::Display for PanelOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "panel op {} ({:?}) failed: {} [nodes={:?}, before_hash={:#x}, after_hash={:#x}]",
            self.operation_id,
            self.kind,
            self.reason,
            self.touched_nodes
                .iter()
                .map(|node_id| node_id.0)
                .collect::<Vec<_>>(),
            self.before_hash,
            self.after_hash
        )
    }
}

impl std::error::Error for PanelOperationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Side effects collected while an operation runs on the working tree.
#[derive(Debug, Default)]
struct OperationEffects {
    touched: BTreeSet<PanelId>,
    created: Vec<PanelId>,
    removed: Vec<PanelId>,
    resized_leaves: BTreeSet<PanelId>,
    applied_boundary: Option<u32>,
}

/// Validated panel tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelTree {
    schema_version: u16,
    root: PanelId,
    next_id: PanelId,
    style: SeparatorStyle,
    min_extent: u32,
    nodes: BTreeMap<PanelId, PanelNode>,
}

impl PanelTree {
    /// Single empty leaf covering `canvas`.
    pub fn new(canvas: Rect) -> Result<Self, PanelModelError> {
        let root = PanelId::MIN;
        if canvas.is_empty() {
            return Err(PanelModelError::EmptyRegion {
                node_id: root,
                region: canvas,
            });
        }
        let mut nodes = BTreeMap::new();
        let _ = nodes.insert(
            root,
            PanelNode::leaf(root, None, canvas, LeafPanel::default()),
        );
        Ok(Self {
            schema_version: PANEL_TREE_SCHEMA_VERSION,
            root,
            next_id: root.checked_next()?,
            style: SeparatorStyle::default(),
            min_extent: DEFAULT_MIN_PANEL_EXTENT,
            nodes,
        })
    }

    /// Style used by later splits. Existing separators keep theirs.
    #[must_use]
    pub fn with_style(mut self, style: SeparatorStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_min_extent(mut self, min_extent: u32) -> Self {
        self.min_extent = min_extent;
        self
    }

    pub fn set_style(&mut self, style: SeparatorStyle) {
        self.style = style;
    }

    pub fn set_min_extent(&mut self, min_extent: u32) {
        self.min_extent = min_extent;
    }

    /// Give every existing separator, and every later split, `color`.
    ///
    /// Returns the separators whose color changed.
    pub fn recolor_separators(&mut self, color: Rgb) -> Vec<PanelId> {
        self.style.color = color;
        let mut changed = Vec::new();
        for node in self.nodes.values_mut() {
            let PanelKind::Separator(separator) = &mut node.kind else {
                continue;
            };
            if separator.color != color {
                separator.color = color;
                changed.push(node.id);
            }
        }
        changed
    }

    /// Construct and validate from a snapshot. Leaves come back without pixels.
    pub fn from_snapshot(mut snapshot: PanelTreeSnapshot) -> Result<Self, PanelModelError> {
        if snapshot.schema_version != PANEL_TREE_SCHEMA_VERSION {
            return Err(PanelModelError::UnsupportedSchemaVersion {
                version: snapshot.schema_version,
            });
        }
        snapshot.canonicalize();
        let mut nodes = BTreeMap::new();
        for node in snapshot.nodes {
            let node_id = node.id;
            if node_id.get() == 0 {
                return Err(PanelModelError::ZeroPanelId);
            }
            if nodes.insert(node_id, node).is_some() {
                return Err(PanelModelError::DuplicateNodeId { node_id });
            }
        }
        validate_tree(snapshot.root, snapshot.next_id, &nodes)?;
        Ok(Self {
            schema_version: snapshot.schema_version,
            root: snapshot.root,
            next_id: snapshot.next_id,
            style: snapshot.style,
            min_extent: snapshot.min_extent,
            nodes,
        })
    }

    /// Export to canonical snapshot form.
    #[must_use]
    pub fn to_snapshot(&self) -> PanelTreeSnapshot {
        let mut snapshot = PanelTreeSnapshot {
            schema_version: self.schema_version,
            root: self.root,
            next_id: self.next_id,
            style: self.style,
            min_extent: self.min_extent,
            nodes: self.nodes.values().cloned().collect(),
        };
        snapshot.canonicalize();
        snapshot
    }

    #[must_use]
    pub const fn root(&self) -> PanelId {
        self.root
    }

    #[must_use]
    pub const fn next_id(&self) -> PanelId {
        self.next_id
    }

    #[must_use]
    pub const fn style(&self) -> SeparatorStyle {
        self.style
    }

    #[must_use]
    pub const fn min_extent(&self) -> u32 {
        self.min_extent
    }

    /// Region of the root node.
    #[must_use]
    pub fn canvas(&self) -> Rect {
        self.nodes
            .get(&self.root)
            .map(|node| node.region)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, id: PanelId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn node(&self, id: PanelId) -> Option<&PanelNode> {
        self.nodes.get(&id)
    }

    /// Iterate nodes in canonical ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &PanelNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn region(&self, id: PanelId) -> Option<Rect> {
        self.nodes.get(&id).map(|node| node.region)
    }

    #[must_use]
    pub fn leaf(&self, id: PanelId) -> Option<&LeafPanel> {
        self.nodes.get(&id).and_then(PanelNode::as_leaf)
    }

    /// Mutable access to leaf content. Geometry stays owned by the tree.
    pub fn leaf_mut(&mut self, id: PanelId) -> Option<&mut LeafPanel> {
        match self.nodes.get_mut(&id) {
            Some(PanelNode {
                kind: PanelKind::Leaf(leaf),
                ..
            }) => Some(leaf),
            _ => None,
        }
    }

    /// Node IDs in depth-first layout order (parents before children).
    #[must_use]
    pub fn walk(&self) -> Vec<PanelId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            order.push(id);
            if let PanelKind::Separator(separator) = &node.kind {
                stack.extend(separator.children.iter().rev().copied());
            }
        }
        order
    }

    /// Leaf IDs in layout order.
    #[must_use]
    pub fn leaves(&self) -> Vec<PanelId> {
        self.walk()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(PanelNode::is_leaf))
            .collect()
    }

    #[must_use]
    pub fn buffer_state(&self, id: PanelId) -> Option<BufferState> {
        let node = self.nodes.get(&id)?;
        node.as_leaf().map(|leaf| leaf.buffer_state(node.region))
    }

    /// Leaves holding a buffer that no longer matches their region.
    #[must_use]
    pub fn stale_leaves(&self) -> Vec<PanelId> {
        self.leaves()
            .into_iter()
            .filter(|id| self.buffer_state(*id) == Some(BufferState::Stale))
            .collect()
    }

    /// Validate internal invariants.
    pub fn validate(&self) -> Result<(), PanelModelError> {
        validate_tree(self.root, self.next_id, &self.nodes)
    }

    /// Deepest node whose region contains `point`, or `None` outside the root.
    ///
    /// Regions are closed. A point in the gap between two children, including
    /// either edge of the gap, resolves to the separator.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<PanelId> {
        let mut current = self.nodes.get(&self.root)?;
        if !point.is_finite() || !current.region.contains_point(point) {
            return None;
        }
        loop {
            let PanelKind::Separator(separator) = &current.kind else {
                return Some(current.id);
            };
            let coord = separator.axis.coordinate(point);
            let mut next = None;
            for pair in separator.children.windows(2) {
                let first = self.nodes.get(&pair[0])?;
                let second = self.nodes.get(&pair[1])?;
                let gap_start = f64::from(separator.axis.end(first.region));
                let gap_end = f64::from(separator.axis.start(second.region));
                if coord >= gap_start && coord <= gap_end {
                    return Some(current.id);
                }
                if coord < gap_start {
                    next = Some(first);
                    break;
                }
            }
            current = match next {
                Some(child) => child,
                None => self.nodes.get(separator.children.last()?)?,
            };
        }
    }

    /// Deterministic structural hash of the current tree state.
    ///
    /// Covers IDs, parent links, regions, and separator attributes. Leaf
    /// content (data, pixels, annotations) is not hashed.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix(hash: &mut u64, byte: u8) {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(PRIME);
        }

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                mix(hash, *byte);
            }
        }

        fn mix_u16(hash: &mut u64, value: u16) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_u32(hash: &mut u64, value: u32) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_u64(hash: &mut u64, value: u64) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_opt_panel_id(hash: &mut u64, value: Option<PanelId>) {
            match value {
                Some(value) => {
                    mix(hash, 1);
                    mix_u64(hash, value.get());
                }
                None => mix(hash, 0),
            }
        }

        fn mix_rect(hash: &mut u64, rect: Rect) {
            mix_u32(hash, rect.x);
            mix_u32(hash, rect.y);
            mix_u32(hash, rect.width);
            mix_u32(hash, rect.height);
        }

        fn mix_rgb(hash: &mut u64, color: Rgb) {
            mix_bytes(hash, &[color.r, color.g, color.b]);
        }

        let mut hash = OFFSET_BASIS;
        mix_u16(&mut hash, self.schema_version);
        mix_u64(&mut hash, self.root.get());
        mix_u64(&mut hash, self.next_id.get());
        mix_u32(&mut hash, self.style.thickness);
        mix_rgb(&mut hash, self.style.color);
        mix_u32(&mut hash, self.min_extent);
        mix_u64(&mut hash, self.nodes.len() as u64);

        for node in self.nodes.values() {
            mix_u64(&mut hash, node.id.get());
            mix_opt_panel_id(&mut hash, node.parent);
            mix_rect(&mut hash, node.region);
            match &node.kind {
                PanelKind::Leaf(_) => mix(&mut hash, 1),
                PanelKind::Separator(separator) => {
                    mix(&mut hash, 2);
                    let axis_byte = match separator.axis {
                        SplitAxis::Horizontal => 1,
                        SplitAxis::Vertical => 2,
                    };
                    mix(&mut hash, axis_byte);
                    mix_u32(&mut hash, separator.thickness);
                    mix_rgb(&mut hash, separator.color);
                    mix_u64(&mut hash, separator.children.len() as u64);
                    for child in &separator.children {
                        mix_u64(&mut hash, child.get());
                    }
                }
            }
        }

        hash
    }

    /// Split `target` into `count` leaves along `axis` (operation id 0).
    pub fn split(
        &mut self,
        target: PanelId,
        axis: SplitAxis,
        count: u32,
    ) -> Result<PanelOperationOutcome, PanelOperationError> {
        self.apply_operation(
            0,
            PanelOperation::Split {
                target,
                axis,
                count,
            },
        )
    }

    /// Remove `target` and its subtree (operation id 0).
    pub fn remove(&mut self, target: PanelId) -> Result<PanelOperationOutcome, PanelOperationError> {
        self.apply_operation(0, PanelOperation::Remove { target })
    }

    /// Move a separator boundary (operation id 0).
    pub fn resize_boundary(
        &mut self,
        separator: PanelId,
        index: usize,
        boundary: i64,
    ) -> Result<PanelOperationOutcome, PanelOperationError> {
        self.apply_operation(
            0,
            PanelOperation::ResizeBoundary {
                separator,
                index,
                boundary,
            },
        )
    }

    /// Apply one structural operation atomically.
    ///
    /// The operation runs on a cloned working tree (leaf buffers are shared,
    /// not copied). On success the clone replaces `self`; on failure `self` is
    /// unchanged.
    pub fn apply_operation(
        &mut self,
        operation_id: u64,
        operation: PanelOperation,
    ) -> Result<PanelOperationOutcome, PanelOperationError> {
        let kind = operation.kind();
        let _span = tracing::debug_span!("panel.operation", operation_id, kind = ?kind).entered();
        let before_hash = self.state_hash();
        let mut working = self.clone();
        let mut effects = OperationEffects {
            touched: operation.referenced_nodes().into_iter().collect(),
            ..OperationEffects::default()
        };

        if let Err(reason) = working.apply_operation_inner(operation, &mut effects) {
            tracing::warn!(
                target: "panelfig.layout",
                operation_id,
                kind = ?kind,
                reason = %reason,
                "panel operation rejected"
            );
            return Err(PanelOperationError {
                operation_id,
                kind,
                touched_nodes: effects.touched.into_iter().collect(),
                before_hash,
                after_hash: working.state_hash(),
                reason,
            });
        }

        let validation = working.validate();
        debug_assert!(
            validation.is_ok(),
            "panel op {operation_id} ({kind:?}) broke tree invariants: {validation:?}"
        );
        if let Err(err) = validation {
            tracing::warn!(
                target: "panelfig.layout",
                operation_id,
                kind = ?kind,
                error = %err,
                "panel operation broke tree invariants; discarded"
            );
            return Err(PanelOperationError {
                operation_id,
                kind,
                touched_nodes: effects.touched.into_iter().collect(),
                before_hash,
                after_hash: working.state_hash(),
                reason: PanelOperationFailure::Validation(err),
            });
        }

        let after_hash = working.state_hash();
        let stale_leaves = effects
            .resized_leaves
            .iter()
            .copied()
            .filter(|id| working.buffer_state(*id) == Some(BufferState::Stale))
            .collect::<Vec<_>>();
        *self = working;

        tracing::debug!(
            target: "panelfig.layout",
            operation_id,
            kind = ?kind,
            created = effects.created.len(),
            removed = effects.removed.len(),
            stale = stale_leaves.len(),
            before_hash,
            after_hash,
            "panel operation applied"
        );

        Ok(PanelOperationOutcome {
            operation_id,
            kind,
            touched_nodes: effects.touched.into_iter().collect(),
            created_nodes: effects.created,
            removed_nodes: effects.removed,
            stale_leaves,
            applied_boundary: effects.applied_boundary,
            before_hash,
            after_hash,
        })
    }

    fn apply_operation_inner(
        &mut self,
        operation: PanelOperation,
        effects: &mut OperationEffects,
    ) -> Result<(), PanelOperationFailure> {
        match operation {
            PanelOperation::Split {
                target,
                axis,
                count,
            } => self.apply_split(target, axis, count, effects),
            PanelOperation::Remove { target } => self.apply_remove(target, effects),
            PanelOperation::ResizeBoundary {
                separator,
                index,
                boundary,
            } => self.apply_resize_boundary(separator, index, boundary, effects),
        }
    }

    fn apply_split(
        &mut self,
        target: PanelId,
        axis: SplitAxis,
        count: u32,
        effects: &mut OperationEffects,
    ) -> Result<(), PanelOperationFailure> {
        let (parent, region) = match self.nodes.get(&target) {
            Some(PanelNode {
                parent,
                region,
                kind: PanelKind::Leaf(_),
                ..
            }) => (*parent, *region),
            Some(_) => return Err(PanelOperationFailure::NodeNotLeaf { node_id: target }),
            None => return Err(PanelOperationFailure::MissingNode { node_id: target }),
        };

        let thickness = self.style.thickness;
        let extent = axis.extent(region);
        let extents =
            split_extents(extent, count, thickness).ok_or(PanelOperationFailure::InvalidSplit {
                node_id: target,
                count,
                extent,
                thickness,
            })?;

        let separator_id = self.allocate_id()?;
        effects.created.push(separator_id);
        let mut children = Vec::with_capacity(extents.len());
        let mut cursor = axis.start(region);
        for child_extent in extents {
            let child_id = self.allocate_id()?;
            let child_region = axis.with_span(region, cursor, child_extent);
            let _ = self.nodes.insert(
                child_id,
                PanelNode::leaf(
                    child_id,
                    Some(separator_id),
                    child_region,
                    LeafPanel::default(),
                ),
            );
            children.push(child_id);
            effects.created.push(child_id);
            cursor += child_extent + thickness;
        }

        let _ = self.nodes.remove(&target);
        effects.removed.push(target);
        let _ = self.nodes.insert(
            separator_id,
            PanelNode::separator(
                separator_id,
                parent,
                region,
                SeparatorPanel {
                    axis,
                    thickness,
                    color: self.style.color,
                    children,
                },
            ),
        );
        self.replace_child(parent, target, separator_id)?;

        let _ = effects.touched.insert(separator_id);
        if let Some(parent) = parent {
            let _ = effects.touched.insert(parent);
        }
        effects.touched.extend(effects.created.iter().copied());
        Ok(())
    }

    fn apply_remove(
        &mut self,
        target: PanelId,
        effects: &mut OperationEffects,
    ) -> Result<(), PanelOperationFailure> {
        let Some(node) = self.nodes.get(&target) else {
            return Err(PanelOperationFailure::MissingNode { node_id: target });
        };
        let Some(parent_id) = node.parent else {
            return Err(PanelOperationFailure::CannotRemoveRoot { node_id: target });
        };
        let (parent_region, grandparent, remaining) = match self.nodes.get(&parent_id) {
            Some(PanelNode {
                region,
                parent,
                kind: PanelKind::Separator(separator),
                ..
            }) => (
                *region,
                *parent,
                separator
                    .children
                    .iter()
                    .copied()
                    .filter(|child| *child != target)
                    .collect::<Vec<_>>(),
            ),
            Some(_) => {
                return Err(PanelOperationFailure::NodeNotSeparator { node_id: parent_id });
            }
            None => return Err(PanelOperationFailure::MissingNode { node_id: parent_id }),
        };

        self.delete_subtree(target, effects);
        let _ = effects.touched.insert(parent_id);

        if let [survivor] = remaining[..] {
            // Collapse the separator level: the survivor takes its place.
            let _ = self.nodes.remove(&parent_id);
            effects.removed.push(parent_id);
            if let Some(node) = self.nodes.get_mut(&survivor) {
                node.parent = grandparent;
            }
            self.replace_child(grandparent, parent_id, survivor)?;
            let _ = effects.touched.insert(survivor);
            if let Some(grandparent) = grandparent {
                let _ = effects.touched.insert(grandparent);
            }
            self.relayout(survivor, parent_region, effects);
        } else {
            effects.touched.extend(remaining.iter().copied());
            if let Some(PanelNode {
                kind: PanelKind::Separator(separator),
                ..
            }) = self.nodes.get_mut(&parent_id)
            {
                separator.children = remaining;
            }
            self.arrange_children(parent_id, effects);
        }
        Ok(())
    }

    fn apply_resize_boundary(
        &mut self,
        separator_id: PanelId,
        index: usize,
        boundary: i64,
        effects: &mut OperationEffects,
    ) -> Result<(), PanelOperationFailure> {
        let (axis, thickness, first, second) = match self.nodes.get(&separator_id) {
            Some(PanelNode {
                kind: PanelKind::Separator(separator),
                ..
            }) => {
                let children = separator.children.len();
                if index + 1 >= children {
                    return Err(PanelOperationFailure::ChildIndexOutOfRange {
                        node_id: separator_id,
                        index,
                        children,
                    });
                }
                (
                    separator.axis,
                    separator.thickness,
                    separator.children[index],
                    separator.children[index + 1],
                )
            }
            Some(_) => {
                return Err(PanelOperationFailure::NodeNotSeparator {
                    node_id: separator_id,
                });
            }
            None => {
                return Err(PanelOperationFailure::MissingNode {
                    node_id: separator_id,
                });
            }
        };
        let first_region = self
            .region(first)
            .ok_or(PanelOperationFailure::MissingNode { node_id: first })?;
        let second_region = self
            .region(second)
            .ok_or(PanelOperationFailure::MissingNode { node_id: second })?;

        let start = axis.start(first_region);
        let end = axis.end(second_region);
        let lo = i64::from(start) + i64::from(self.required_extent(first, axis));
        let hi = i64::from(end)
            - i64::from(thickness)
            - i64::from(self.required_extent(second, axis));
        let applied = boundary.clamp(lo, hi.max(lo));
        let applied = u32::try_from(applied).unwrap_or(start);

        let _ = effects.touched.insert(first);
        let _ = effects.touched.insert(second);
        effects.applied_boundary = Some(applied);
        self.relayout(
            first,
            axis.with_span(first_region, start, applied - start),
            effects,
        );
        let second_start = applied + thickness;
        self.relayout(
            second,
            axis.with_span(second_region, second_start, end.saturating_sub(second_start)),
            effects,
        );
        Ok(())
    }

    fn allocate_id(&mut self) -> Result<PanelId, PanelOperationFailure> {
        let id = self.next_id;
        self.next_id = id
            .checked_next()
            .map_err(|_| PanelOperationFailure::PanelIdOverflow { current: id })?;
        Ok(id)
    }

    /// Point `parent`'s child slot for `old` at `new`, or re-root at `new`.
    fn replace_child(
        &mut self,
        parent: Option<PanelId>,
        old: PanelId,
        new: PanelId,
    ) -> Result<(), PanelOperationFailure> {
        let Some(parent) = parent else {
            self.root = new;
            return Ok(());
        };
        match self.nodes.get_mut(&parent) {
            Some(PanelNode {
                kind: PanelKind::Separator(separator),
                ..
            }) => {
                if let Some(slot) = separator.children.iter_mut().find(|child| **child == old) {
                    *slot = new;
                }
                Ok(())
            }
            Some(_) => Err(PanelOperationFailure::NodeNotSeparator { node_id: parent }),
            None => Err(PanelOperationFailure::MissingNode { node_id: parent }),
        }
    }

    fn delete_subtree(&mut self, id: PanelId, effects: &mut OperationEffects) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.remove(&current) else {
                continue;
            };
            if let PanelKind::Separator(separator) = node.kind {
                stack.extend(separator.children);
            }
            let _ = effects.touched.insert(current);
            effects.removed.push(current);
        }
    }

    /// Resize floor for a single leaf.
    fn leaf_floor(&self) -> u32 {
        self.min_extent.max(self.style.thickness).max(1)
    }

    /// Smallest extent along `axis` that `id` can be shrunk to without
    /// pushing any leaf under the floor. A leaf already below the floor
    /// requires only its current extent.
    fn required_extent(&self, id: PanelId, axis: SplitAxis) -> u32 {
        let Some(node) = self.nodes.get(&id) else {
            return 1;
        };
        match &node.kind {
            PanelKind::Leaf(_) => self.leaf_floor().min(axis.extent(node.region)),
            PanelKind::Separator(separator) if separator.axis == axis => {
                let gaps = separator
                    .thickness
                    .saturating_mul(separator.children.len().saturating_sub(1) as u32);
                separator
                    .children
                    .iter()
                    .map(|child| self.required_extent(*child, axis))
                    .fold(gaps, u32::saturating_add)
            }
            PanelKind::Separator(separator) => separator
                .children
                .iter()
                .map(|child| self.required_extent(*child, axis))
                .max()
                .unwrap_or(1),
        }
    }

    /// Give `id` a new region and lay out its subtree inside it.
    fn relayout(&mut self, id: PanelId, region: Rect, effects: &mut OperationEffects) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let old = node.region;
        node.region = region;
        match &node.kind {
            PanelKind::Leaf(_) => {
                if !old.same_size(&region) {
                    let _ = effects.resized_leaves.insert(id);
                }
                if old != region {
                    let _ = effects.touched.insert(id);
                }
            }
            PanelKind::Separator(_) => {
                if old != region {
                    let _ = effects.touched.insert(id);
                }
                self.arrange_children(id, effects);
            }
        }
    }

    /// Redistribute a separator's region over its children, keeping their
    /// relative extents along the axis.
    fn arrange_children(&mut self, id: PanelId, effects: &mut OperationEffects) {
        let Some(PanelNode {
            region,
            kind: PanelKind::Separator(separator),
            ..
        }) = self.nodes.get(&id)
        else {
            return;
        };
        let region = *region;
        let axis = separator.axis;
        let thickness = separator.thickness;
        let children = separator.children.clone();

        let weights = children
            .iter()
            .map(|child| self.region(*child).map_or(1, |r| axis.extent(r)))
            .collect::<Vec<_>>();
        let mins = children
            .iter()
            .map(|child| self.required_extent(*child, axis))
            .collect::<Vec<_>>();
        let gaps = thickness.saturating_mul(children.len().saturating_sub(1) as u32);
        let available = axis.extent(region).saturating_sub(gaps);
        let extents = distribute(&weights, available, &mins);

        let mut cursor = axis.start(region);
        for (child, extent) in children.into_iter().zip(extents) {
            self.relayout(child, axis.with_span(region, cursor, extent), effects);
            cursor += extent + thickness;
        }
    }
}

/// Equal split of `extent` into `count` parts separated by `thickness`-pixel
/// gaps; the last part absorbs the remainder. `None` if any part would be
/// empty.
#[must_use]
pub fn split_extents(extent: u32, count: u32, thickness: u32) -> Option<Vec<u32>> {
    if count < 2 {
        return None;
    }
    let gaps = thickness.checked_mul(count - 1)?;
    let available = extent.checked_sub(gaps)?;
    let base = available / count;
    if base == 0 {
        return None;
    }
    let mut extents = vec![base; count as usize];
    if let Some(last) = extents.last_mut() {
        *last += available % count;
    }
    Some(extents)
}

/// Distribute `total` proportionally to `weights`, flooring each share and
/// giving the remainder to the last entry, then raise entries to their
/// `mins` by taking from the trailing entries with slack.
fn distribute(weights: &[u32], total: u32, mins: &[u32]) -> Vec<u32> {
    let count = weights.len();
    if count == 0 {
        return Vec::new();
    }
    let sum: u64 = weights.iter().map(|w| u64::from(*w)).sum();
    let mut extents = if sum == u64::from(total) {
        weights.to_vec()
    } else if sum == 0 {
        vec![total / count as u32; count]
    } else {
        weights
            .iter()
            .map(|w| (u64::from(*w) * u64::from(total) / sum) as u32)
            .collect::<Vec<_>>()
    };
    let assigned: u32 = extents.iter().sum();
    if let Some(last) = extents.last_mut() {
        *last += total.saturating_sub(assigned);
    }

    let mut deficit = 0u32;
    for (extent, min) in extents.iter_mut().zip(mins) {
        if *extent < *min {
            deficit += *min - *extent;
            *extent = *min;
        }
    }
    for (extent, min) in extents.iter_mut().zip(mins).rev() {
        if deficit == 0 {
            break;
        }
        let take = extent.saturating_sub(*min).min(deficit);
        *extent -= take;
        deficit -= take;
    }
    extents
}

/// Validation errors for tree construction and post-operation checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelModelError {
    ZeroPanelId,
    UnsupportedSchemaVersion {
        version: u16,
    },
    DuplicateNodeId {
        node_id: PanelId,
    },
    MissingRoot {
        root: PanelId,
    },
    RootHasParent {
        root: PanelId,
        parent: PanelId,
    },
    MissingParent {
        node_id: PanelId,
        parent: PanelId,
    },
    MissingChild {
        parent: PanelId,
        child: PanelId,
    },
    MultipleParents {
        child: PanelId,
        first_parent: PanelId,
        second_parent: PanelId,
    },
    ParentMismatch {
        node_id: PanelId,
        expected: Option<PanelId>,
        actual: Option<PanelId>,
    },
    TooFewChildren {
        node_id: PanelId,
        count: usize,
    },
    EmptyRegion {
        node_id: PanelId,
        region: Rect,
    },
    ChildOutOfPlace {
        parent: PanelId,
        child: PanelId,
        expected: Rect,
        actual: Rect,
    },
    TilingMismatch {
        node_id: PanelId,
        axis: SplitAxis,
        expected_end: u32,
        actual_end: u32,
    },
    CycleDetected {
        node_id: PanelId,
    },
    UnreachableNode {
        node_id: PanelId,
    },
    NextIdNotGreaterThanExisting {
        next_id: PanelId,
        max_existing: PanelId,
    },
    PanelIdOverflow {
        current: PanelId,
    },
}

impl fmt::Display for PanelModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPanelId => write!(f, "panel id 0 is invalid"),
            Self::UnsupportedSchemaVersion { version } => write!(
                f,
                "unsupported panel schema version {version} (expected {PANEL_TREE_SCHEMA_VERSION})"
            ),
            Self::DuplicateNodeId { node_id } => write!(f, "duplicate panel node id {node_id}"),
            Self::MissingRoot { root } => write!(f, "root panel node {root} not found"),
            Self::RootHasParent { root, parent } => {
                write!(f, "root panel node {root} must not have parent {parent}")
            }
            Self::MissingParent { node_id, parent } => {
                write!(f, "node {node_id} references missing parent {parent}")
            }
            Self::MissingChild { parent, child } => {
                write!(f, "separator {parent} references missing child {child}")
            }
            Self::MultipleParents {
                child,
                first_parent,
                second_parent,
            } => write!(
                f,
                "node {child} has multiple parents: {first_parent} and {second_parent}"
            ),
            Self::ParentMismatch {
                node_id,
                expected,
                actual,
            } => write!(
                f,
                "node {node_id} parent mismatch: expected {:?}, got {:?}",
                expected.map(PanelId::get),
                actual.map(PanelId::get)
            ),
            Self::TooFewChildren { node_id, count } => write!(
                f,
                "separator {node_id} has {count} children (at least 2 required)"
            ),
            Self::EmptyRegion { node_id, region } => write!(
                f,
                "node {node_id} has an empty region {}x{} at ({}, {})",
                region.width, region.height, region.x, region.y
            ),
            Self::ChildOutOfPlace {
                parent,
                child,
                expected,
                actual,
            } => write!(
                f,
                "child {child} of separator {parent} is at {actual:?}, expected {expected:?}"
            ),
            Self::TilingMismatch {
                node_id,
                axis,
                expected_end,
                actual_end,
            } => write!(
                f,
                "{axis:?} separator {node_id}: children end at {actual_end}, region ends at {expected_end}"
            ),
            Self::CycleDetected { node_id } => write!(f, "cycle detected at node {node_id}"),
            Self::UnreachableNode { node_id } => {
                write!(f, "node {node_id} is unreachable from root")
            }
            Self::NextIdNotGreaterThanExisting {
                next_id,
                max_existing,
            } => write!(
                f,
                "next_id {next_id} must be greater than max existing id {max_existing}"
            ),
            Self::PanelIdOverflow { current } => write!(f, "panel id overflow after {current}"),
        }
    }
}

impl std::error::Error for PanelModelError {}

fn validate_tree(
    root: PanelId,
    next_id: PanelId,
    nodes: &BTreeMap<PanelId, PanelNode>,
) -> Result<(), PanelModelError> {
    if !nodes.contains_key(&root) {
        return Err(PanelModelError::MissingRoot { root });
    }

    let max_existing = nodes.keys().next_back().copied().unwrap_or(root);
    if next_id <= max_existing {
        return Err(PanelModelError::NextIdNotGreaterThanExisting {
            next_id,
            max_existing,
        });
    }

    let mut expected_parents = BTreeMap::new();

    for node in nodes.values() {
        if node.region.is_empty() {
            return Err(PanelModelError::EmptyRegion {
                node_id: node.id,
                region: node.region,
            });
        }

        if let Some(parent) = node.parent
            && !nodes.contains_key(&parent)
        {
            return Err(PanelModelError::MissingParent {
                node_id: node.id,
                parent,
            });
        }

        if let PanelKind::Separator(separator) = &node.kind {
            if separator.children.len() < 2 {
                return Err(PanelModelError::TooFewChildren {
                    node_id: node.id,
                    count: separator.children.len(),
                });
            }
            for child in &separator.children {
                if *child == node.id {
                    return Err(PanelModelError::CycleDetected { node_id: node.id });
                }
                if !nodes.contains_key(child) {
                    return Err(PanelModelError::MissingChild {
                        parent: node.id,
                        child: *child,
                    });
                }
                if let Some(first_parent) = expected_parents.insert(*child, node.id) {
                    return Err(PanelModelError::MultipleParents {
                        child: *child,
                        first_parent,
                        second_parent: node.id,
                    });
                }
            }
            validate_tiling(node, separator, nodes)?;
        }
    }

    if let Some(parent) = nodes.get(&root).and_then(|node| node.parent) {
        return Err(PanelModelError::RootHasParent { root, parent });
    }

    for node in nodes.values() {
        let expected = if node.id == root {
            None
        } else {
            expected_parents.get(&node.id).copied()
        };
        if node.parent != expected {
            return Err(PanelModelError::ParentMismatch {
                node_id: node.id,
                expected,
                actual: node.parent,
            });
        }
    }

    let mut visiting = BTreeSet::new();
    let mut visited = BTreeSet::new();
    dfs_validate(root, nodes, &mut visiting, &mut visited)?;

    if visited.len() != nodes.len()
        && let Some(node_id) = nodes.keys().find(|node_id| !visited.contains(node_id))
    {
        return Err(PanelModelError::UnreachableNode { node_id: *node_id });
    }

    Ok(())
}

/// Children must sit back to back along the axis with `thickness` gaps, span
/// the separator fully across, and end exactly where the separator ends.
fn validate_tiling(
    node: &PanelNode,
    separator: &SeparatorPanel,
    nodes: &BTreeMap<PanelId, PanelNode>,
) -> Result<(), PanelModelError> {
    let axis = separator.axis;
    let mut cursor = axis.start(node.region);
    for (position, child_id) in separator.children.iter().enumerate() {
        let Some(child) = nodes.get(child_id) else {
            return Err(PanelModelError::MissingChild {
                parent: node.id,
                child: *child_id,
            });
        };
        if position > 0 {
            cursor = cursor.saturating_add(separator.thickness);
        }
        let expected = axis.with_span(node.region, cursor, axis.extent(child.region));
        if child.region != expected {
            return Err(PanelModelError::ChildOutOfPlace {
                parent: node.id,
                child: *child_id,
                expected,
                actual: child.region,
            });
        }
        cursor = axis.end(child.region);
    }
    let expected_end = axis.end(node.region);
    if cursor != expected_end {
        return Err(PanelModelError::TilingMismatch {
            node_id: node.id,
            axis,
            expected_end,
            actual_end: cursor,
        });
    }
    Ok(())
}

fn dfs_validate(
    node_id: PanelId,
    nodes: &BTreeMap<PanelId, PanelNode>,
    visiting: &mut BTreeSet<PanelId>,
    visited: &mut BTreeSet<PanelId>,
) -> Result<(), PanelModelError> {
    if visiting.contains(&node_id) {
        return Err(PanelModelError::CycleDetected { node_id });
    }
    if !visited.insert(node_id) {
        return Ok(());
    }
    let _ = visiting.insert(node_id);
    if let Some(PanelNode {
        kind: PanelKind::Separator(separator),
        ..
    }) = nodes.get(&node_id)
    {
        for child in &separator.children {
            dfs_validate(*child, nodes, visiting, visited)?;
        }
    }
    let _ = visiting.remove(&node_id);
    Ok(())
}
