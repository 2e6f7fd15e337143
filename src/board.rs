//! Kanban board state: one ordered column of application ids per status,
//! plus the drag session that moves cards between them.
//!
//! The board never writes records itself. An accepted cross-column drop is
//! reported through [`BoardHandler::status_changed`]; the caller applies it
//! to the store and calls [`Board::sync`] with the new collection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::kv::{KvStore, BOARD_ORDER_KEY};
use crate::models::{Application, ApplicationId, Status};
use crate::store::RecordStore;

/// Callbacks the surrounding application provides.
pub trait BoardHandler {
    fn edit_requested(&mut self, app: &Application);
    fn delete_requested(&mut self, id: &str);
    fn status_changed(&mut self, id: &str, status: Status);
    fn open_requested(&mut self, app: &Application);
    fn hover_enter(&mut self, _app: &Application) {}
    fn hover_leave(&mut self) {}
}

/// How [`Board::sync`] treats the order users set up by dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPolicy {
    /// Rebuild every column from scratch, newest application first.
    #[default]
    #[serde(alias = "date")]
    ByDate,
    /// Keep cards that stayed in a column where they were; newcomers are
    /// appended newest first.
    #[serde(alias = "manual")]
    PreserveManual,
}

/// Where a dragged card was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Column background; the card goes to the end.
    Column(Status),
    /// Another card; the dragged card takes its index.
    Card(ApplicationId),
}

impl DropTarget {
    /// Column names win over card ids.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Status>() {
            Ok(status) => DropTarget::Column(status),
            Err(_) => DropTarget::Card(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing to do: no drag, no target, or the target did not resolve.
    Ignored,
    /// The eligibility rule refused the destination column.
    Rejected { to: Status },
    Reordered { column: Status, from: usize, to: usize },
    Moved { from: Status, to: Status, index: usize },
}

/// Ordered ids per status. Indexed by `Status`, so every column exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partitions([Vec<ApplicationId>; 5]);

impl Partitions {
    /// Newest application first; equal dates keep collection order.
    pub fn derive(apps: &[Application]) -> Self {
        let mut sorted: Vec<&Application> = apps.iter().collect();
        sorted.sort_by(|a, b| b.date_applied.cmp(&a.date_applied));

        let mut partitions = Partitions::default();
        for app in sorted {
            partitions.0[app.status.index()].push(app.id.clone());
        }
        partitions
    }

    pub fn column(&self, status: Status) -> &[ApplicationId] {
        &self.0[status.index()]
    }

    fn column_mut(&mut self, status: Status) -> &mut Vec<ApplicationId> {
        &mut self.0[status.index()]
    }

    /// Column currently holding `id`.
    pub fn find(&self, id: &str) -> Option<Status> {
        Status::ALL
            .into_iter()
            .find(|status| self.column(*status).iter().any(|x| x == id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, &[ApplicationId])> {
        Status::ALL.into_iter().map(move |status| (status, self.column(status)))
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Board {
    partitions: Partitions,
    by_id: HashMap<ApplicationId, Application>,
    dragging: Option<ApplicationId>,
    policy: OrderPolicy,
}

impl Board {
    pub fn new(apps: &[Application], policy: OrderPolicy) -> Self {
        Self::restore(apps, policy, None)
    }

    /// Under `PreserveManual`, starts from a column order saved by an
    /// earlier session. Saved ids that no longer sit in that column are
    /// dropped; `ByDate` ignores the saved order.
    pub fn restore(apps: &[Application], policy: OrderPolicy, saved: Option<Partitions>) -> Self {
        let partitions = match policy {
            OrderPolicy::PreserveManual => saved.unwrap_or_default(),
            OrderPolicy::ByDate => Partitions::default(),
        };
        let mut board = Self {
            partitions,
            by_id: HashMap::new(),
            dragging: None,
            policy,
        };
        board.sync(apps);
        board
    }

    pub fn partitions(&self) -> &Partitions {
        &self.partitions
    }

    pub fn column(&self, status: Status) -> &[ApplicationId] {
        self.partitions.column(status)
    }

    pub fn get(&self, id: &str) -> Option<&Application> {
        self.by_id.get(id)
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Re-derives the columns after the record collection changed.
    pub fn sync(&mut self, apps: &[Application]) {
        self.by_id = apps.iter().map(|a| (a.id.clone(), a.clone())).collect();
        let derived = Partitions::derive(apps);

        self.partitions = match self.policy {
            OrderPolicy::ByDate => derived,
            OrderPolicy::PreserveManual => {
                let mut merged = Partitions::default();
                for status in Status::ALL {
                    let column = merged.column_mut(status);
                    let kept = self
                        .partitions
                        .column(status)
                        .iter()
                        .filter(|id| self.by_id.get(*id).is_some_and(|a| a.status == status));
                    for id in kept.chain(derived.column(status)) {
                        if !column.contains(id) {
                            column.push(id.clone());
                        }
                    }
                }
                merged
            }
        };
        tracing::debug!(cards = self.partitions.len(), policy = ?self.policy, "board synced");
    }

    /// Drops `id` from its column without touching any other position.
    pub fn remove(&mut self, id: &str) {
        if let Some(status) = self.partitions.find(id) {
            self.partitions.column_mut(status).retain(|x| x != id);
        }
        self.by_id.remove(id);
        if self.dragging.as_deref() == Some(id) {
            self.dragging = None;
        }
    }

    pub fn drag_start(&mut self, id: &str) {
        tracing::trace!(id, "drag start");
        self.dragging = Some(id.to_string());
    }

    /// Abandons the drag; the card stays where it was.
    pub fn drag_cancel(&mut self) {
        self.dragging = None;
    }

    pub fn drag_end(
        &mut self,
        target: Option<DropTarget>,
        handler: &mut dyn BoardHandler,
    ) -> DropOutcome {
        let Some(active) = self.dragging.take() else {
            return DropOutcome::Ignored;
        };
        let Some(target) = target else {
            return DropOutcome::Ignored;
        };
        let Some(from) = self.partitions.find(&active) else {
            return DropOutcome::Ignored;
        };
        let to = match &target {
            DropTarget::Column(status) => Some(*status),
            DropTarget::Card(id) => self.partitions.find(id),
        };
        let Some(to) = to else {
            return DropOutcome::Ignored;
        };
        let Some(app) = self.by_id.get(&active) else {
            return DropOutcome::Ignored;
        };

        if !can_drop(app, to) {
            tracing::debug!(id = %active, %to, "drop refused for offer-stage application");
            return DropOutcome::Rejected { to };
        }

        if from == to {
            let column = self.partitions.column_mut(from);
            let Some(from_idx) = column.iter().position(|x| *x == active) else {
                return DropOutcome::Ignored;
            };
            let to_idx = match &target {
                DropTarget::Column(_) => column.len() - 1,
                DropTarget::Card(id) => match column.iter().position(|x| x == id) {
                    Some(idx) => idx,
                    None => return DropOutcome::Ignored,
                },
            };
            if from_idx == to_idx {
                return DropOutcome::Ignored;
            }
            let moved = column.remove(from_idx);
            column.insert(to_idx, moved);
            tracing::debug!(id = %active, column = %from, from_idx, to_idx, "reordered");
            return DropOutcome::Reordered {
                column: from,
                from: from_idx,
                to: to_idx,
            };
        }

        self.partitions.column_mut(from).retain(|x| *x != active);
        let dest = self.partitions.column_mut(to);
        let index = match &target {
            DropTarget::Column(_) => dest.len(),
            DropTarget::Card(id) => dest.iter().position(|x| x == id).unwrap_or(dest.len()),
        };
        dest.insert(index, active.clone());

        tracing::debug!(id = %active, %from, %to, index, "moved");
        handler.status_changed(&active, to);
        DropOutcome::Moved { from, to, index }
    }

    pub fn request_edit(&self, id: &str, handler: &mut dyn BoardHandler) {
        if let Some(app) = self.by_id.get(id) {
            handler.edit_requested(app);
        }
    }

    pub fn request_delete(&self, id: &str, handler: &mut dyn BoardHandler) {
        if self.by_id.contains_key(id) {
            handler.delete_requested(id);
        }
    }

    pub fn request_open(&self, id: &str, handler: &mut dyn BoardHandler) {
        if let Some(app) = self.by_id.get(id) {
            handler.open_requested(app);
        }
    }

    pub fn hover(&self, id: Option<&str>, handler: &mut dyn BoardHandler) {
        match id.and_then(|id| self.by_id.get(id)) {
            Some(app) => handler.hover_enter(app),
            None => handler.hover_leave(),
        }
    }
}

/// Column order saved by [`save_order`]. An unreadable value is logged and
/// treated as absent.
pub fn load_order(kv: &dyn KvStore) -> StoreResult<Option<Partitions>> {
    let Some(raw) = kv.get(BOARD_ORDER_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(order) => Ok(Some(order)),
        Err(e) => {
            tracing::warn!(error = %e, "saved board order is malformed; ignoring it");
            Ok(None)
        }
    }
}

pub fn save_order(kv: &mut dyn KvStore, partitions: &Partitions) -> StoreResult<()> {
    kv.set(BOARD_ORDER_KEY, &serde_json::to_string(partitions)?)?;
    tracing::debug!(cards = partitions.len(), "saved board order");
    Ok(())
}

/// Offer-stage applications may only move to Offer, Accepted or Rejected.
pub fn can_drop(app: &Application, to: Status) -> bool {
    if app.is_offer_like() {
        return matches!(to, Status::Offer | Status::Accepted | Status::Rejected);
    }
    true
}

/// Applies board callbacks to a [`RecordStore`], keeping the first failure.
pub struct StoreSync<'a> {
    store: &'a mut RecordStore,
    error: Option<StoreError>,
}

impl<'a> StoreSync<'a> {
    pub fn new(store: &'a mut RecordStore) -> Self {
        Self { store, error: None }
    }

    pub fn finish(self) -> StoreResult<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: StoreResult<crate::store::Outcome>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "board change was not saved");
            self.error.get_or_insert(e);
        }
    }
}

impl BoardHandler for StoreSync<'_> {
    fn edit_requested(&mut self, app: &Application) {
        tracing::trace!(id = %app.id, "edit requested");
    }

    fn delete_requested(&mut self, id: &str) {
        let result = self.store.delete(id);
        self.record(result);
    }

    fn status_changed(&mut self, id: &str, status: Status) {
        let result = self.store.set_status(id, status);
        self.record(result);
    }

    fn open_requested(&mut self, app: &Application) {
        tracing::trace!(id = %app.id, "open requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::models::NewApplication;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder {
        status_changes: Vec<(String, Status)>,
        deletes: Vec<String>,
        opened: Vec<String>,
        edited: Vec<String>,
        hovered: Option<String>,
    }

    impl BoardHandler for Recorder {
        fn edit_requested(&mut self, app: &Application) {
            self.edited.push(app.id.clone());
        }
        fn delete_requested(&mut self, id: &str) {
            self.deletes.push(id.to_string());
        }
        fn status_changed(&mut self, id: &str, status: Status) {
            self.status_changes.push((id.to_string(), status));
        }
        fn open_requested(&mut self, app: &Application) {
            self.opened.push(app.id.clone());
        }
        fn hover_enter(&mut self, app: &Application) {
            self.hovered = Some(app.id.clone());
        }
        fn hover_leave(&mut self) {
            self.hovered = None;
        }
    }

    fn app(id: &str, status: Status, day: u32) -> Application {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let mut app = Application::from_new(id.into(), NewApplication::new("Acme", "Engineer", date));
        app.status = status;
        app
    }

    fn ids(board: &Board, status: Status) -> Vec<&str> {
        board.column(status).iter().map(String::as_str).collect()
    }

    fn drop_on(board: &mut Board, id: &str, target: DropTarget, handler: &mut Recorder) -> DropOutcome {
        board.drag_start(id);
        board.drag_end(Some(target), handler)
    }

    fn assert_partition_invariant(board: &Board, apps: &[Application]) {
        assert_eq!(board.partitions().len(), apps.len());
        for app in apps {
            let holding: Vec<Status> = board
                .partitions()
                .iter()
                .filter(|(_, ids)| ids.contains(&app.id))
                .map(|(status, _)| status)
                .collect();
            assert_eq!(holding, vec![app.status], "{}", app.id);
        }
    }

    #[test]
    fn derive_sorts_newest_first_within_each_column() {
        let apps = vec![
            app("a", Status::Applied, 1),
            app("b", Status::Applied, 9),
            app("c", Status::Interviewing, 3),
            app("d", Status::Applied, 5),
            app("e", Status::Accepted, 2),
        ];
        let board = Board::new(&apps, OrderPolicy::ByDate);

        assert_eq!(ids(&board, Status::Applied), ["b", "d", "a"]);
        assert_eq!(ids(&board, Status::Interviewing), ["c"]);
        assert!(board.column(Status::Offer).is_empty());
        assert_eq!(ids(&board, Status::Accepted), ["e"]);
        assert_partition_invariant(&board, &apps);
    }

    #[test]
    fn equal_dates_keep_collection_order() {
        let apps = vec![app("x", Status::Applied, 4), app("y", Status::Applied, 4)];
        let board = Board::new(&apps, OrderPolicy::ByDate);
        assert_eq!(ids(&board, Status::Applied), ["x", "y"]);
    }

    #[test]
    fn empty_collection_gives_empty_columns() {
        let board = Board::new(&[], OrderPolicy::ByDate);
        assert!(board.partitions().is_empty());
        assert_eq!(board.partitions().iter().count(), 5);
    }

    #[test]
    fn offer_status_cannot_go_back_to_early_columns() {
        let apps = vec![app("o", Status::Offer, 1), app("i", Status::Interviewing, 2)];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let before = board.partitions().clone();
        let mut handler = Recorder::default();

        for target in [
            DropTarget::Column(Status::Interviewing),
            DropTarget::Column(Status::Applied),
            DropTarget::Card("i".into()),
        ] {
            let outcome = drop_on(&mut board, "o", target, &mut handler);
            assert_matches!(outcome, DropOutcome::Rejected { .. });
        }
        assert_eq!(board.partitions(), &before);
        assert!(handler.status_changes.is_empty());
        assert_eq!(board.dragging(), None);
    }

    #[test]
    fn offer_details_alone_make_an_application_offer_like() {
        let mut pending = app("p", Status::Applied, 1);
        pending.offer_details.salary = "150k".into();
        let mut board = Board::new(&[pending], OrderPolicy::ByDate);
        let mut handler = Recorder::default();

        let outcome = drop_on(&mut board, "p", DropTarget::Column(Status::Interviewing), &mut handler);
        assert_eq!(outcome, DropOutcome::Rejected { to: Status::Interviewing });
        assert!(handler.status_changes.is_empty());

        let outcome = drop_on(&mut board, "p", DropTarget::Column(Status::Offer), &mut handler);
        assert_matches!(outcome, DropOutcome::Moved { from: Status::Applied, to: Status::Offer, .. });
        assert_eq!(handler.status_changes, vec![("p".to_string(), Status::Offer)]);
    }

    #[test]
    fn offer_like_can_close_out_and_lands_there_after_sync() {
        for target in [Status::Accepted, Status::Rejected] {
            let mut apps = vec![app("o", Status::Offer, 1)];
            let mut board = Board::new(&apps, OrderPolicy::ByDate);
            let mut handler = Recorder::default();

            drop_on(&mut board, "o", DropTarget::Column(target), &mut handler);
            assert_eq!(handler.status_changes, vec![("o".to_string(), target)]);

            apps[0].status = target;
            board.sync(&apps);
            assert_eq!(ids(&board, target), ["o"]);
            assert_partition_invariant(&board, &apps);
        }
    }

    #[test]
    fn offer_details_alone_block_reorder_in_applied() {
        let mut pending = app("p", Status::Applied, 9);
        pending.offer_details.bonus = "10%".into();
        let apps = vec![pending, app("q", Status::Applied, 1)];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let before = board.partitions().clone();
        let mut handler = Recorder::default();

        for target in [DropTarget::Column(Status::Applied), DropTarget::Card("q".into())] {
            let outcome = drop_on(&mut board, "p", target, &mut handler);
            assert_eq!(outcome, DropOutcome::Rejected { to: Status::Applied });
        }
        assert_eq!(board.partitions(), &before);
        assert!(handler.status_changes.is_empty());
    }

    #[test]
    fn plain_application_can_move_anywhere() {
        for target in Status::ALL.into_iter().filter(|s| *s != Status::Applied) {
            let mut board = Board::new(&[app("a", Status::Applied, 1)], OrderPolicy::ByDate);
            let mut handler = Recorder::default();

            let outcome = drop_on(&mut board, "a", DropTarget::Column(target), &mut handler);
            assert_eq!(outcome, DropOutcome::Moved { from: Status::Applied, to: target, index: 0 });
            assert_eq!(handler.status_changes, vec![("a".to_string(), target)]);
            assert_eq!(ids(&board, target), ["a"]);
        }
    }

    #[test]
    fn dropping_on_own_column_background_moves_to_end() {
        let apps = vec![app("a", Status::Applied, 3), app("b", Status::Applied, 2), app("c", Status::Applied, 1)];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let mut handler = Recorder::default();

        let outcome = drop_on(&mut board, "a", DropTarget::Column(Status::Applied), &mut handler);
        assert_eq!(outcome, DropOutcome::Reordered { column: Status::Applied, from: 0, to: 2 });
        assert_eq!(ids(&board, Status::Applied), ["b", "c", "a"]);
        assert!(handler.status_changes.is_empty());
    }

    #[test]
    fn dropping_first_on_second_swaps_them() {
        let apps = vec![app("a", Status::Applied, 2), app("b", Status::Applied, 1)];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let mut handler = Recorder::default();

        let outcome = drop_on(&mut board, "a", DropTarget::Card("b".into()), &mut handler);
        assert_eq!(outcome, DropOutcome::Reordered { column: Status::Applied, from: 0, to: 1 });
        assert_eq!(ids(&board, Status::Applied), ["b", "a"]);
        assert!(handler.status_changes.is_empty());
    }

    #[test]
    fn cross_column_drop_on_card_takes_its_index() {
        let apps = vec![
            app("a", Status::Applied, 9),
            app("x", Status::Interviewing, 3),
            app("y", Status::Interviewing, 2),
        ];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let mut handler = Recorder::default();

        let outcome = drop_on(&mut board, "a", DropTarget::Card("y".into()), &mut handler);
        assert_eq!(outcome, DropOutcome::Moved { from: Status::Applied, to: Status::Interviewing, index: 1 });
        assert_eq!(ids(&board, Status::Interviewing), ["x", "a", "y"]);
        assert!(board.column(Status::Applied).is_empty());
    }

    #[test]
    fn unresolved_targets_leave_state_alone() {
        let apps = vec![app("a", Status::Applied, 1)];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let before = board.partitions().clone();
        let mut handler = Recorder::default();

        board.drag_start("a");
        assert_eq!(board.drag_end(None, &mut handler), DropOutcome::Ignored);
        assert_eq!(drop_on(&mut board, "a", DropTarget::Card("ghost".into()), &mut handler), DropOutcome::Ignored);
        assert_eq!(drop_on(&mut board, "ghost", DropTarget::Column(Status::Offer), &mut handler), DropOutcome::Ignored);
        assert_eq!(drop_on(&mut board, "a", DropTarget::Card("a".into()), &mut handler), DropOutcome::Ignored);
        assert_eq!(board.drag_end(Some(DropTarget::Column(Status::Offer)), &mut handler), DropOutcome::Ignored);

        assert_eq!(board.partitions(), &before);
        assert!(handler.status_changes.is_empty());
    }

    #[test]
    fn cancelled_drag_does_nothing() {
        let mut board = Board::new(&[app("a", Status::Applied, 1)], OrderPolicy::ByDate);
        let mut handler = Recorder::default();
        board.drag_start("a");
        board.drag_cancel();
        assert_eq!(board.drag_end(Some(DropTarget::Column(Status::Offer)), &mut handler), DropOutcome::Ignored);
    }

    #[test]
    fn by_date_sync_discards_manual_order() {
        let mut apps = vec![app("a", Status::Applied, 2), app("b", Status::Applied, 1), app("z", Status::Rejected, 1)];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        let mut handler = Recorder::default();
        drop_on(&mut board, "a", DropTarget::Card("b".into()), &mut handler);
        assert_eq!(ids(&board, Status::Applied), ["b", "a"]);

        apps[2].notes = "unrelated edit".into();
        board.sync(&apps);
        assert_eq!(ids(&board, Status::Applied), ["a", "b"]);
    }

    #[test]
    fn preserve_manual_sync_keeps_manual_order() {
        let mut apps = vec![app("a", Status::Applied, 2), app("b", Status::Applied, 1), app("z", Status::Rejected, 1)];
        let mut board = Board::new(&apps, OrderPolicy::PreserveManual);
        let mut handler = Recorder::default();
        drop_on(&mut board, "a", DropTarget::Card("b".into()), &mut handler);

        apps[2].notes = "unrelated edit".into();
        apps.push(app("n", Status::Applied, 20));
        board.sync(&apps);
        assert_eq!(ids(&board, Status::Applied), ["b", "a", "n"]);
        assert_partition_invariant(&board, &apps);
    }

    #[test]
    fn preserve_manual_keeps_drop_position_after_status_commit() {
        let mut apps = vec![
            app("a", Status::Applied, 1),
            app("x", Status::Interviewing, 9),
            app("y", Status::Interviewing, 8),
        ];
        let mut board = Board::new(&apps, OrderPolicy::PreserveManual);
        let mut handler = Recorder::default();
        drop_on(&mut board, "a", DropTarget::Card("x".into()), &mut handler);

        apps[0].status = Status::Interviewing;
        board.sync(&apps);
        assert_eq!(ids(&board, Status::Interviewing), ["a", "x", "y"]);
    }

    #[test]
    fn saved_order_survives_a_new_session_under_manual_policy() {
        let apps = vec![app("a", Status::Applied, 3), app("b", Status::Applied, 2), app("c", Status::Applied, 1)];
        let mut board = Board::new(&apps, OrderPolicy::PreserveManual);
        let mut handler = Recorder::default();
        drop_on(&mut board, "a", DropTarget::Column(Status::Applied), &mut handler);

        let mut kv = MemoryKv::new();
        save_order(&mut kv, board.partitions()).unwrap();

        let saved = load_order(&kv).unwrap();
        let restored = Board::restore(&apps, OrderPolicy::PreserveManual, saved.clone());
        assert_eq!(ids(&restored, Status::Applied), ["b", "c", "a"]);

        let by_date = Board::restore(&apps, OrderPolicy::ByDate, saved);
        assert_eq!(ids(&by_date, Status::Applied), ["a", "b", "c"]);
    }

    #[test]
    fn saved_order_drops_stale_ids_and_adds_newcomers() {
        let mut kv = MemoryKv::new();
        let old = vec![app("a", Status::Applied, 1), app("gone", Status::Applied, 2), app("b", Status::Applied, 3)];
        let mut board = Board::new(&old, OrderPolicy::PreserveManual);
        let mut handler = Recorder::default();
        drop_on(&mut board, "b", DropTarget::Column(Status::Applied), &mut handler);
        save_order(&mut kv, board.partitions()).unwrap();

        let mut now = vec![app("a", Status::Interviewing, 1), app("b", Status::Applied, 3), app("n", Status::Applied, 9)];
        now[0].notes = "moved on".into();
        let restored = Board::restore(&now, OrderPolicy::PreserveManual, load_order(&kv).unwrap());
        assert_eq!(ids(&restored, Status::Applied), ["b", "n"]);
        assert_eq!(ids(&restored, Status::Interviewing), ["a"]);
        assert_partition_invariant(&restored, &now);
    }

    #[test]
    fn unreadable_saved_order_is_ignored() {
        let mut kv = MemoryKv::new();
        assert_eq!(load_order(&kv).unwrap(), None);
        kv.set(BOARD_ORDER_KEY, "[[\"a\"]").unwrap();
        assert_eq!(load_order(&kv).unwrap(), None);
    }

    #[test]
    fn remove_touches_only_the_removed_card() {
        let apps = vec![
            app("a", Status::Applied, 3),
            app("b", Status::Applied, 2),
            app("c", Status::Applied, 1),
            app("d", Status::Offer, 1),
        ];
        let mut board = Board::new(&apps, OrderPolicy::ByDate);
        board.remove("b");
        assert_eq!(ids(&board, Status::Applied), ["a", "c"]);
        assert_eq!(ids(&board, Status::Offer), ["d"]);
        assert!(board.get("b").is_none());
    }

    #[test]
    fn delete_through_store_then_sync() {
        let mut store = RecordStore::new();
        let date = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let a = store.create(NewApplication::new("Acme", "A", date(3))).unwrap();
        let b = store.create(NewApplication::new("Globex", "B", date(2))).unwrap();
        let c = store.create(NewApplication::new("Initech", "C", date(1))).unwrap();
        let mut board = Board::new(store.applications(), OrderPolicy::ByDate);

        let mut sync = StoreSync::new(&mut store);
        board.request_delete(&b, &mut sync);
        sync.finish().unwrap();
        board.sync(store.applications());

        assert!(store.get(&b).is_none());
        assert_eq!(board.column(Status::Applied), [a, c]);
        assert_eq!(board.partitions().find(&b), None);
    }

    #[test]
    fn store_sync_commits_status_and_board_follows() {
        let mut store = RecordStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let id = store.create(NewApplication::new("Acme", "A", date)).unwrap();
        let mut board = Board::new(store.applications(), OrderPolicy::ByDate);

        board.drag_start(&id);
        let mut sync = StoreSync::new(&mut store);
        board.drag_end(Some(DropTarget::parse("interviewing")), &mut sync);
        sync.finish().unwrap();
        board.sync(store.applications());

        assert_eq!(store.require(&id).unwrap().status, Status::Interviewing);
        assert_eq!(board.column(Status::Interviewing), [id]);
    }

    #[test]
    fn request_helpers_route_to_handler() {
        let mut board = Board::new(&[app("a", Status::Applied, 1)], OrderPolicy::ByDate);
        let mut handler = Recorder::default();

        board.request_edit("a", &mut handler);
        board.request_open("a", &mut handler);
        board.request_open("ghost", &mut handler);
        board.hover(Some("a"), &mut handler);
        assert_eq!(handler.hovered.as_deref(), Some("a"));
        board.hover(None, &mut handler);
        assert_eq!(handler.hovered, None);
        assert_eq!(handler.edited, ["a"]);
        assert_eq!(handler.opened, ["a"]);

        board.remove("a");
        board.request_delete("a", &mut handler);
        assert!(handler.deletes.is_empty());
    }

    #[test]
    fn drop_target_prefers_column_names() {
        assert_eq!(DropTarget::parse("Offer"), DropTarget::Column(Status::Offer));
        assert_eq!(DropTarget::parse("1715000000123"), DropTarget::Card("1715000000123".into()));
    }
}
