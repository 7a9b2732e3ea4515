//! Typed row indices and external identifiers.
//!
//! Each table has its own index type so that, for example, an `ExportId` can never be passed
//! where a `StudyId` is expected.

use norpreg_types::{row_id, text_id};

row_id!(RegistryId);
row_id!(AddressId);
row_id!(
    /// Row index of a [`PatientIdentifierHistory`](crate::registry::PatientIdentifierHistory) entry.
    PatientIdHistoryId
);
row_id!(CourseId);
row_id!(DataStatusId);
row_id!(MapStudyUidId);
row_id!(MapSeriesUidId);
row_id!(MapInstanceUidId);
row_id!(StudyId);
row_id!(ExportId);
row_id!(PatientExportId);
row_id!(RegistryExportId);
row_id!(PvkEventId);
row_id!(PvkSyncId);

text_id!(
    /// Course identifier in the oncology information system (for example a course in Aria).
    OisCourseId
);
