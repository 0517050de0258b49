//! The stack-of-stacks.
//!
//! `paths` holds one segment per navigator sharing this stack: the root
//! segment first, then one per pushed nested flow (anchored by that flow's
//! root entry). The rendering layer observes the flattened `path`. Invariants
//! after every operation:
//!
//! - `path.len() == paths.iter().map(Vec::len).sum()`
//! - `owners.len() == view_builders.len() == paths.len()`

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::info::NavigatorInfo;
use super::types::{AlertState, Rendered, ViewBuilder};
use crate::mvi::{Channel, Subscription};
use crate::runtime;

pub type SharedManager = Rc<RefCell<NavigationManager>>;

type Cleanup = Box<dyn FnOnce()>;

pub struct NavigationManager {
    paths: Vec<Vec<NavigatorInfo>>,
    path: Vec<NavigatorInfo>,
    root: NavigatorInfo,
    sheet: Option<NavigatorInfo>,
    full_screen_cover: Option<NavigatorInfo>,
    alert: Option<AlertState>,
    view_builders: Vec<ViewBuilder>,
    owners: Vec<String>,
    syncing_back: bool,
    cleanups: HashMap<String, Cleanup>,
    on_dismiss: Channel<()>,
}

impl fmt::Debug for NavigationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationManager")
            .field("root", &self.root)
            .field("paths", &self.paths)
            .field("owners", &self.owners)
            .field("sheet", &self.sheet)
            .field("full_screen_cover", &self.full_screen_cover)
            .field("alert", &self.alert)
            .finish()
    }
}

/// Serializable view of a stack, for diagnostics and the demo binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackSnapshot {
    pub root: String,
    pub segments: Vec<Vec<String>>,
    pub owners: Vec<String>,
    pub sheet: Option<String>,
    pub full_screen_cover: Option<String>,
    pub alert: Option<AlertState>,
}

impl NavigationManager {
    pub fn new(root: NavigatorInfo, owner: impl Into<String>, view_builder: ViewBuilder) -> Self {
        Self {
            paths: vec![Vec::new()],
            path: Vec::new(),
            root,
            sheet: None,
            full_screen_cover: None,
            alert: None,
            view_builders: vec![view_builder],
            owners: vec![owner.into()],
            syncing_back: false,
            cleanups: HashMap::new(),
            on_dismiss: Channel::named("on_dismiss"),
        }
    }

    pub fn root(&self) -> &NavigatorInfo {
        &self.root
    }

    pub fn path(&self) -> &[NavigatorInfo] {
        &self.path
    }

    pub fn paths(&self) -> &[Vec<NavigatorInfo>] {
        &self.paths
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn view_builder_count(&self) -> usize {
        self.view_builders.len()
    }

    pub fn sheet(&self) -> Option<&NavigatorInfo> {
        self.sheet.as_ref()
    }

    pub fn full_screen_cover(&self) -> Option<&NavigatorInfo> {
        self.full_screen_cover.as_ref()
    }

    pub fn alert(&self) -> Option<&AlertState> {
        self.alert.as_ref()
    }

    /// Emits when `dismiss` is called on the root segment.
    pub fn on_dismiss(&self, f: impl Fn() + 'static) -> Subscription {
        self.on_dismiss.subscribe(move |()| f())
    }

    pub fn push(&mut self, info: NavigatorInfo) {
        let Some(segment) = self.paths.last_mut() else {
            return;
        };
        segment.push(info);
        self.refresh_path();
    }

    /// Open a new segment `[root]` owned by `owner`. No-op when `owner`
    /// already owns a segment.
    pub fn create_new_path(&mut self, owner: impl Into<String>, root: NavigatorInfo, view_builder: ViewBuilder) {
        let owner = owner.into();
        if self.owners.contains(&owner) {
            tracing::debug!(owner = %owner, "Segment owner already present");
            return;
        }
        self.paths.push(vec![root]);
        self.view_builders.push(view_builder);
        self.owners.push(owner);
        self.refresh_path();
    }

    pub fn pop(&mut self) {
        let Some(popped) = self.paths.last_mut().and_then(Vec::pop) else {
            return;
        };
        self.refresh_path();
        self.depart([popped]);
    }

    /// Clear the root segment, or cut a nested segment back to its anchor.
    pub fn pop_to_root(&mut self) {
        let is_root = self.paths.len() == 1;
        let Some(segment) = self.paths.last_mut() else {
            return;
        };
        let keep = if is_root { 0 } else { segment.len().min(1) };
        let removed: Vec<NavigatorInfo> = segment.drain(keep..).collect();
        self.refresh_path();
        self.depart(removed);
    }

    /// On the root segment, emit a dismiss request to the hosting surface;
    /// otherwise drop the whole last segment with its owner and view builder.
    pub fn dismiss(&mut self) {
        if self.paths.len() <= 1 {
            tracing::debug!("Dismiss on root segment");
            self.on_dismiss.send(());
            return;
        }
        let removed = self.paths.pop().unwrap_or_default();
        self.owners.truncate(self.paths.len());
        self.view_builders.truncate(self.paths.len());
        self.refresh_path();
        self.depart(removed);
    }

    /// Present `info` as the sheet, replacing (and cleaning up) any previous one.
    pub fn set_sheet(&mut self, info: Option<NavigatorInfo>) {
        let previous = std::mem::replace(&mut self.sheet, info);
        self.depart_replaced(previous, self.sheet.clone());
    }

    pub fn set_full_screen_cover(&mut self, info: Option<NavigatorInfo>) {
        let previous = std::mem::replace(&mut self.full_screen_cover, info);
        self.depart_replaced(previous, self.full_screen_cover.clone());
    }

    pub fn set_alert(&mut self, alert: Option<AlertState>) {
        self.alert = alert;
    }

    /// Apply a flattened path reported by the rendering layer.
    ///
    /// Only shrinking is meaningful (user-driven pops); the shrinkage is
    /// redistributed across segments from the end. Any other change is
    /// rejected and the flattened path is rebuilt from the segments.
    pub fn set_path(&mut self, path: Vec<NavigatorInfo>) {
        let previous = std::mem::replace(&mut self.path, path);
        if self.path.len() < previous.len() && previous.starts_with(&self.path) {
            self.sync_back();
            let removed = previous.into_iter().skip(self.path.len());
            self.depart(removed.collect::<Vec<_>>());
        } else if self.path != previous {
            tracing::warn!(
                reported = self.path.len(),
                expected = previous.len(),
                "Path changed outside the navigator, resyncing"
            );
            self.path = previous;
        }
    }

    fn sync_back(&mut self) {
        self.syncing_back = true;
        let mut target = self.path.len();
        let mut kept = Vec::with_capacity(self.paths.len());
        for (index, mut segment) in std::mem::take(&mut self.paths).into_iter().enumerate() {
            if target == 0 {
                if index == 0 {
                    kept.push(Vec::new());
                }
                continue;
            }
            if segment.len() > target {
                segment.truncate(target);
                target = 0;
            } else {
                target -= segment.len();
            }
            kept.push(segment);
        }
        self.paths = kept;
        self.owners.truncate(self.paths.len());
        self.view_builders.truncate(self.paths.len());
        self.refresh_path();
        self.syncing_back = false;
        debug_assert!(self.invariants_hold());
    }

    fn refresh_path(&mut self) {
        if self.syncing_back {
            return;
        }
        self.path = self.paths.concat();
    }

    pub fn can_pop(&self) -> bool {
        let anchor = if self.paths.len() == 1 { 0 } else { 1 };
        self.paths.last().is_some_and(|segment| segment.len() > anchor)
    }

    pub fn invariants_hold(&self) -> bool {
        let total: usize = self.paths.iter().map(Vec::len).sum();
        self.path.len() == total
            && self.owners.len() == self.paths.len()
            && self.view_builders.len() == self.paths.len()
    }

    /// Register the closure that detaches the entry with view model id `id`.
    pub fn register_cleanup(&mut self, id: impl Into<String>, cleanup: impl FnOnce() + 'static) {
        self.cleanups.insert(id.into(), Box::new(cleanup));
    }

    /// Move a cleanup to a new id.
    pub fn rekey_cleanup(&mut self, from: &str, to: impl Into<String>) {
        if let Some(cleanup) = self.cleanups.remove(from) {
            self.cleanups.insert(to.into(), cleanup);
        }
    }

    /// Whether an entry other than `id` still shows the view model at `addr`,
    /// on the path or in a presentation slot.
    pub fn presents_elsewhere(&self, addr: usize, id: &str) -> bool {
        self.path
            .iter()
            .chain(self.sheet.iter())
            .chain(self.full_screen_cover.iter())
            .any(|info| info.view_model().addr() == addr && info.id() != id)
    }

    pub fn has_cleanup(&self, id: &str) -> bool {
        self.cleanups.contains_key(id)
    }

    /// Run and forget the cleanups registered for `ids`. Unknown ids are ignored.
    pub fn run_cleanups<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for id in ids {
            if let Some(cleanup) = self.cleanups.remove(id.as_ref()) {
                tracing::debug!(id = id.as_ref(), "Running navigation cleanup");
                runtime::enqueue(cleanup);
            }
        }
    }

    fn depart(&mut self, infos: impl IntoIterator<Item = NavigatorInfo>) {
        let ids: Vec<String> = infos.into_iter().map(|info| info.id().to_string()).collect();
        self.run_cleanups(ids);
    }

    fn depart_replaced(&mut self, previous: Option<NavigatorInfo>, current: Option<NavigatorInfo>) {
        let Some(previous) = previous else {
            return;
        };
        match current {
            Some(current) if current == previous => {
                // same view model under a fresh id: its newer cleanup supersedes
                if current.id() != previous.id() {
                    self.cleanups.remove(previous.id());
                }
            }
            _ => self.depart([previous]),
        }
    }

    pub(crate) fn view_builders(&self) -> Vec<ViewBuilder> {
        self.view_builders.clone()
    }

    /// Try every segment's view builder in order; never fails.
    pub fn build_view(&self, info: &NavigatorInfo) -> Rendered {
        resolve_view(&self.view_builders, info)
    }

    pub fn snapshot(&self) -> StackSnapshot {
        let describe = |info: &NavigatorInfo| info.description();
        StackSnapshot {
            root: describe(&self.root),
            segments: self
                .paths
                .iter()
                .map(|segment| segment.iter().map(describe).collect())
                .collect(),
            owners: self.owners.clone(),
            sheet: self.sheet.as_ref().map(describe),
            full_screen_cover: self.full_screen_cover.as_ref().map(describe),
            alert: self.alert.clone(),
        }
    }
}

pub(crate) fn resolve_view(builders: &[ViewBuilder], info: &NavigatorInfo) -> Rendered {
    builders
        .iter()
        .find_map(|builder| builder(info.view_model()))
        .unwrap_or(Rendered::Empty)
}
