use serde::{Deserialize, Serialize};

use xref_types::SubjectId;

use crate::record::CrossRecord;

/// Position-based record classification: the earliest record for a subject
/// is its creation, every later one an edit. This assumes creations are
/// never retroactively reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    Creation,
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: CrossRecord,
    pub class: RecordClass,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub records: Vec<HistoryEntry>,
    pub pagination: PageInfo,
}

/// Build one page of a subject's cross-reference history.
///
/// Records are classified in ascending creation order and delivered in
/// descending order, newest first. Pages are 1-based.
pub fn build_history(
    all: &[CrossRecord],
    subject: &SubjectId,
    page: usize,
    limit: usize,
) -> HistoryReport {
    let page = page.max(1);
    let limit = limit.max(1);

    let mut matching: Vec<&CrossRecord> = all
        .iter()
        .filter(|r| &r.subject_id == subject)
        .collect();

    if matching.is_empty() {
        return HistoryReport {
            records: Vec::new(),
            pagination: PageInfo {
                current_page: page,
                total_pages: 0,
                total_records: 0,
                has_next_page: false,
                has_previous_page: false,
            },
        };
    }

    // Ascending by creation time decides which record is the creation;
    // record id breaks timestamp ties deterministically.
    matching.sort_by_key(|r| (r.created_at, r.record_id));
    let mut classified: Vec<HistoryEntry> = matching
        .into_iter()
        .enumerate()
        .map(|(index, record)| HistoryEntry {
            record: record.clone(),
            class: if index == 0 {
                RecordClass::Creation
            } else {
                RecordClass::Edit
            },
        })
        .collect();

    // Page delivery is newest first.
    classified.sort_by_key(|e| std::cmp::Reverse((e.record.created_at, e.record.record_id)));

    let total_records = classified.len();
    let total_pages = total_records.div_ceil(limit);
    let start = (page - 1) * limit;
    let end = (start + limit).min(total_records);
    let records = if start < total_records {
        classified[start..end].to_vec()
    } else {
        Vec::new()
    };

    HistoryReport {
        records,
        pagination: PageInfo {
            current_page: page,
            total_pages,
            total_records,
            has_next_page: start + limit < total_records,
            has_previous_page: page > 1,
        },
    }
}
