//! Enroll and unenroll as single logical operations over the seat ledger and the enrollment store.
//!
//! The two stores cannot be written in one transaction, so the order of the writes matters: a seat is taken
//! before the enrollment record is created and released after the record is removed. A failure between the two
//! writes is compensated on enroll and reported as [`EnrollmentError::SeatsNotReleased`] on unenroll.
//!
//! The per-user limit is read before a seat is taken and enforced again by the store when the record is
//! written. An enroll refused at that point gives its seat back like any other failed write.

use std::error::Error;
use std::sync::Arc;

use course_service_core::auth::Identity;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use super::{Enrollment, EnrollmentStore, EnrollmentStoreError};
use crate::seat_ledger::{SeatLedger, SeatLedgerError};

pub const DEFAULT_MAX_ENROLLMENTS: usize = 3;

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Course not found.")]
    CourseNotFound,

    #[error("Already enrolled in this course.")]
    AlreadyEnrolled,

    #[error("Cannot enroll in more than {0} courses.")]
    EnrollmentLimit(usize),

    #[error("No seats remaining in this course.")]
    NoSeats,

    #[error("Not enrolled in this course.")]
    NotEnrolled,

    #[error("The enrollment was removed but its seat could not be released.")]
    SeatsNotReleased,

    #[error(transparent)]
    Datastore(Box<dyn Error + Send + Sync>),
}

impl From<SeatLedgerError> for EnrollmentError {
    fn from(err: SeatLedgerError) -> Self {
        match err {
            SeatLedgerError::NotFound => Self::CourseNotFound,
            SeatLedgerError::Capacity { .. } => Self::NoSeats,
            SeatLedgerError::Datastore(e) => Self::Datastore(e),
        }
    }
}

impl From<EnrollmentStoreError> for EnrollmentError {
    fn from(err: EnrollmentStoreError) -> Self {
        match err {
            EnrollmentStoreError::Duplicate => Self::AlreadyEnrolled,
            EnrollmentStoreError::NotFound => Self::NotEnrolled,
            EnrollmentStoreError::LimitReached(max) => Self::EnrollmentLimit(max),
            EnrollmentStoreError::Datastore(e) => Self::Datastore(e),
        }
    }
}

/// A successful enroll, with the seat count the ledger reported right after taking the seat.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrolled {
    pub enrollment: Enrollment,
    pub seats_remaining: u32,
}

/// Authoritative enrollment state of a user for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
    pub seats_remaining: u32,
}

#[derive(Clone)]
pub struct EnrollmentService {
    ledger: Arc<dyn SeatLedger>,
    store: Arc<dyn EnrollmentStore>,
    max_enrollments: usize,
}

impl EnrollmentService {
    pub fn new(ledger: Arc<dyn SeatLedger>, store: Arc<dyn EnrollmentStore>, max_enrollments: usize) -> Self {
        Self {
            ledger,
            store,
            max_enrollments,
        }
    }

    pub fn max_enrollments(&self) -> usize {
        self.max_enrollments
    }

    /// Enrolls the caller in a course, taking one seat.
    ///
    /// Runs on its own task: once started, the operation completes even if the caller goes away.
    #[tracing::instrument(skip(self, identity, course_title), fields(user_id = %identity.user_id()))]
    pub async fn enroll(
        &self,
        identity: &Identity,
        course_id: Uuid,
        course_title: String,
    ) -> Result<Enrolled, EnrollmentError> {
        let service = self.clone();
        let identity = identity.clone();
        tokio::spawn(async move { service.enroll_detached(identity, course_id, course_title).await }.in_current_span())
            .await
            .map_err(|e| EnrollmentError::Datastore(e.into()))?
    }

    /// Removes the caller's enrollment and releases its seat. Returns the seat count after the release.
    ///
    /// Runs on its own task, like [`EnrollmentService::enroll`].
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id()))]
    pub async fn unenroll(&self, identity: &Identity, course_id: Uuid) -> Result<u32, EnrollmentError> {
        let service = self.clone();
        let user_id = *identity.user_id();
        tokio::spawn(async move { service.unenroll_detached(user_id, course_id).await }.in_current_span())
            .await
            .map_err(|e| EnrollmentError::Datastore(e.into()))?
    }

    /// Re-reads enrollment and seat state from the stores.
    pub async fn status(&self, identity: &Identity, course_id: &Uuid) -> Result<EnrollmentStatus, EnrollmentError> {
        let enrolled = self
            .store
            .find_by_user_and_course(identity.user_id(), course_id)
            .await?
            .is_some();
        let seats_remaining = self.ledger.seats(course_id).await?;

        Ok(EnrollmentStatus {
            enrolled,
            seats_remaining,
        })
    }

    pub async fn enrollments(&self, identity: &Identity) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.store.list_for_user(identity.user_id()).await?)
    }

    pub async fn is_enrolled(&self, identity: &Identity, course_id: &Uuid) -> Result<bool, EnrollmentError> {
        Ok(self
            .store
            .find_by_user_and_course(identity.user_id(), course_id)
            .await?
            .is_some())
    }

    async fn enroll_detached(
        &self,
        identity: Identity,
        course_id: Uuid,
        course_title: String,
    ) -> Result<Enrolled, EnrollmentError> {
        let user_id = *identity.user_id();

        if self.store.find_by_user_and_course(&user_id, &course_id).await?.is_some() {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        // Refuses early without touching the ledger; `create` enforces the limit again atomically with the write.
        if self.store.count_for_user(&user_id).await? >= self.max_enrollments {
            return Err(EnrollmentError::EnrollmentLimit(self.max_enrollments));
        }

        if self.ledger.seats(&course_id).await? == 0 {
            return Err(EnrollmentError::NoSeats);
        }

        // A concurrent enroll may have taken the last seat since the read above; the ledger refuses with
        // `Capacity`, which surfaces as `NoSeats`.
        let seats_remaining = self.ledger.adjust_seats(&course_id, -1).await?;

        let enrollment = Enrollment::builder()
            .user_id(user_id)
            .user_email(identity.email())
            .course_id(course_id)
            .course_title(course_title)
            .build();

        match self.store.create(enrollment, self.max_enrollments).await {
            Ok(enrollment) => {
                tracing::info!(enrollment_id = %enrollment.enrollment_id, seats_remaining, "Enrolled.");
                Ok(Enrolled {
                    enrollment,
                    seats_remaining,
                })
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Creating the enrollment failed, releasing the seat.");
                self.release_seat(&course_id).await?;
                Err(err.into())
            }
        }
    }

    async fn unenroll_detached(&self, user_id: Uuid, course_id: Uuid) -> Result<u32, EnrollmentError> {
        let enrollment = self
            .store
            .find_by_user_and_course(&user_id, &course_id)
            .await?
            .ok_or(EnrollmentError::NotEnrolled)?;

        self.store.remove(&enrollment).await?;

        match self.ledger.adjust_seats(&course_id, 1).await {
            Ok(seats_remaining) => {
                tracing::info!(enrollment_id = %enrollment.enrollment_id, seats_remaining, "Unenrolled.");
                Ok(seats_remaining)
            }
            Err(SeatLedgerError::NotFound) => {
                tracing::warn!(enrollment_id = %enrollment.enrollment_id, "Unenrolled from a deleted course.");
                Ok(0)
            }
            Err(err) => {
                tracing::error!(
                    error = ?err,
                    enrollment_id = %enrollment.enrollment_id,
                    "Enrollment removed but releasing its seat failed."
                );
                Err(EnrollmentError::SeatsNotReleased)
            }
        }
    }

    /// Gives back the seat taken by an enroll whose record could not be written.
    async fn release_seat(&self, course_id: &Uuid) -> Result<(), EnrollmentError> {
        self.ledger.adjust_seats(course_id, 1).await.map(|_| ()).map_err(|err| {
            tracing::error!(error = ?err, %course_id, "Releasing the seat of a failed enrollment failed, one seat is lost.");
            EnrollmentError::Datastore(err.into())
        })
    }
}
