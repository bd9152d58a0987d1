use crate::error::{Error, Result};
use crate::import::{self, ImportRow, ImportSummary};
use crate::models::{
    ABSENT, AttendanceEntry, AttendanceRecord, AttendanceSummary, DashboardStats,
    NewAttendanceRecord, NewStudent, NewSubject, PRESENT, Student, StudentChanges, Subject,
    SubjectChanges, attendance_rate,
};
use crate::schema::{attendance_records, students, subjects};
use chrono::{NaiveDate, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::path::Path;

/// Tables are created on first connect. `attendance_records` deliberately carries no unique index
/// on (student, subject, date): only the importer deduplicates.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    student_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT,
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS attendance_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    student_id INTEGER NOT NULL REFERENCES students (id),
    subject_id INTEGER NOT NULL REFERENCES subjects (id),
    date DATE NOT NULL,
    status TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
);
"#;

/// The manager for recording, modifying, and retrieving students, subjects, and attendance.
pub struct AttendanceManager {
    db: SqliteConnection,
}

impl AttendanceManager {
    /// Creates a new `AttendanceManager` by connecting to the `sqlite3` database at
    /// `database_url`, creating the tables if they do not exist yet.
    ///
    /// Pass `":memory:"` for a throwaway database.
    pub fn connect(database_url: &str) -> Result<Self> {
        let mut db = SqliteConnection::establish(database_url)?;
        db.batch_execute(SCHEMA)?;

        tracing::debug!(database_url, "database schema ready");

        Ok(Self { db })
    }

    /// Returns the total number of students on the roster.
    pub fn num_students(&mut self) -> Result<usize> {
        let count: i64 = students::table.count().get_result(&mut self.db)?;
        Ok(count as usize)
    }

    /// Returns the total number of subjects.
    pub fn num_subjects(&mut self) -> Result<usize> {
        let count: i64 = subjects::table.count().get_result(&mut self.db)?;
        Ok(count as usize)
    }

    /// Returns the total number of attendance records.
    pub fn num_records(&mut self) -> Result<usize> {
        let count: i64 = attendance_records::table.count().get_result(&mut self.db)?;
        Ok(count as usize)
    }

    /// Retrieves all students on the roster, in creation order.
    pub fn get_roster(&mut self) -> Result<Vec<Student>> {
        Ok(students::table
            .order(students::id)
            .select(Student::as_select())
            .load(&mut self.db)?)
    }

    /// Adds a student to the roster.
    ///
    /// Fails with [`Error::Conflict`] if another student already has the same `student_id`.
    pub fn create_student(
        &mut self,
        student_id: &str,
        name: &str,
        email: Option<&str>,
    ) -> Result<Student> {
        let new_student = NewStudent {
            student_id,
            name,
            email,
            created_at: Utc::now().naive_utc(),
        };

        insert_student(&mut self.db, &new_student)
    }

    /// Replaces the natural id, name, and email of the student with the given primary key.
    pub fn update_student(
        &mut self,
        key: i32,
        student_id: &str,
        name: &str,
        email: Option<&str>,
    ) -> Result<Student> {
        let changes = StudentChanges {
            student_id,
            name,
            email,
        };

        diesel::update(students::table.find(key))
            .set(&changes)
            .returning(Student::as_returning())
            .get_result(&mut self.db)
            .map_err(|err| match err {
                DieselError::NotFound => Error::NotFound(format!("student {key}")),
                err => Error::from_unique_violation(err, || format!("student_id {student_id}")),
            })
    }

    /// Removes a student from the roster given their primary key.
    ///
    /// Attendance records referring to the student are left in place.
    pub fn delete_student(&mut self, key: i32) -> Result<()> {
        let deleted = diesel::delete(students::table.find(key)).execute(&mut self.db)?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("student {key}")));
        }

        Ok(())
    }

    /// Retrieves all subjects, in creation order.
    pub fn get_subjects(&mut self) -> Result<Vec<Subject>> {
        Ok(subjects::table
            .order(subjects::id)
            .select(Subject::as_select())
            .load(&mut self.db)?)
    }

    /// Adds a subject.
    ///
    /// Fails with [`Error::Conflict`] if another subject already has the same `code`.
    pub fn create_subject(&mut self, code: &str, name: &str) -> Result<Subject> {
        let new_subject = NewSubject {
            code,
            name,
            created_at: Utc::now().naive_utc(),
        };

        insert_subject(&mut self.db, &new_subject)
    }

    /// Replaces the code and name of the subject with the given primary key.
    pub fn update_subject(&mut self, key: i32, code: &str, name: &str) -> Result<Subject> {
        diesel::update(subjects::table.find(key))
            .set(&SubjectChanges { code, name })
            .returning(Subject::as_returning())
            .get_result(&mut self.db)
            .map_err(|err| match err {
                DieselError::NotFound => Error::NotFound(format!("subject {key}")),
                err => Error::from_unique_violation(err, || format!("subject code {code}")),
            })
    }

    /// Removes a subject given its primary key.
    ///
    /// Attendance records referring to the subject are left in place.
    pub fn delete_subject(&mut self, key: i32) -> Result<()> {
        let deleted = diesel::delete(subjects::table.find(key)).execute(&mut self.db)?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("subject {key}")));
        }

        Ok(())
    }

    /// Retrieves every attendance record along with the names of its student and subject.
    pub fn get_attendance(&mut self) -> Result<Vec<AttendanceEntry>> {
        let rows = attendance_records::table
            .left_join(students::table)
            .left_join(subjects::table)
            .order(attendance_records::id)
            .select((
                AttendanceRecord::as_select(),
                students::name.nullable(),
                subjects::name.nullable(),
            ))
            .load::<(AttendanceRecord, Option<String>, Option<String>)>(&mut self.db)?;

        Ok(rows
            .into_iter()
            .map(|(record, student, subject)| AttendanceEntry::new(record, student, subject))
            .collect())
    }

    /// Records a student's status for a subject on a given date.
    ///
    /// Both the student and the subject must exist. Unlike [`AttendanceManager::import_rows`],
    /// this does not check for an existing record with the same student, subject, and date.
    pub fn create_attendance(
        &mut self,
        student_key: i32,
        subject_key: i32,
        date: NaiveDate,
        status: &str,
    ) -> Result<AttendanceEntry> {
        let student: Student = students::table
            .find(student_key)
            .select(Student::as_select())
            .first(&mut self.db)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("student {student_key}")))?;

        let subject: Subject = subjects::table
            .find(subject_key)
            .select(Subject::as_select())
            .first(&mut self.db)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("subject {subject_key}")))?;

        let record = insert_attendance(
            &mut self.db,
            &NewAttendanceRecord {
                student_id: student.id,
                subject_id: subject.id,
                date,
                status,
                created_at: Utc::now().naive_utc(),
            },
        )?;

        Ok(AttendanceEntry::new(
            record,
            Some(student.name),
            Some(subject.name),
        ))
    }

    /// Removes an attendance record given its primary key.
    pub fn delete_attendance(&mut self, key: i32) -> Result<()> {
        let deleted = diesel::delete(attendance_records::table.find(key)).execute(&mut self.db)?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("attendance record {key}")));
        }

        Ok(())
    }

    /// Counts the records with the given status.
    fn count_status(&mut self, wanted: &str) -> Result<usize> {
        let count: i64 = attendance_records::table
            .filter(attendance_records::status.eq(wanted))
            .count()
            .get_result(&mut self.db)?;

        Ok(count as usize)
    }

    /// Returns the present / absent breakdown over every attendance record.
    ///
    /// Records whose status is neither [`PRESENT`] nor [`ABSENT`] count toward the total only.
    pub fn summary(&mut self) -> Result<AttendanceSummary> {
        let total_records = self.num_records()?;
        let present_count = self.count_status(PRESENT)?;
        let absent_count = self.count_status(ABSENT)?;

        Ok(AttendanceSummary {
            total_records,
            present_count,
            absent_count,
            attendance_rate: attendance_rate(present_count, total_records),
        })
    }

    /// Returns the headline numbers for the dashboard.
    pub fn dashboard_stats(&mut self) -> Result<DashboardStats> {
        let total_records = self.num_records()?;
        let present_count = self.count_status(PRESENT)?;

        Ok(DashboardStats {
            total_students: self.num_students()?,
            total_subjects: self.num_subjects()?,
            total_records,
            present_count,
            attendance_rate: attendance_rate(present_count, total_records),
        })
    }

    /// Stores the given spreadsheet rows in a single transaction.
    ///
    /// Students and subjects are looked up by their natural keys and created when missing. An
    /// attendance record is only inserted if none exists yet for the same student, subject, and
    /// date, so importing the same rows twice inserts nothing the second time. If any row fails,
    /// nothing from the import is kept.
    pub fn import_rows(&mut self, rows: &[ImportRow]) -> Result<ImportSummary> {
        self.db.transaction::<_, Error, _>(|conn| {
            let mut summary = ImportSummary::default();

            for row in rows {
                let student = match find_student(conn, &row.student_id)? {
                    Some(student) => student,
                    None => {
                        summary.students_created += 1;
                        insert_student(
                            conn,
                            &NewStudent {
                                student_id: &row.student_id,
                                name: &row.student_name,
                                email: None,
                                created_at: Utc::now().naive_utc(),
                            },
                        )?
                    }
                };

                let subject = match find_subject(conn, &row.subject_code)? {
                    Some(subject) => subject,
                    None => {
                        summary.subjects_created += 1;
                        insert_subject(
                            conn,
                            &NewSubject {
                                code: &row.subject_code,
                                name: &row.subject_name,
                                created_at: Utc::now().naive_utc(),
                            },
                        )?
                    }
                };

                if attendance_exists(conn, student.id, subject.id, row.date)? {
                    summary.duplicates_skipped += 1;
                    continue;
                }

                insert_attendance(
                    conn,
                    &NewAttendanceRecord {
                        student_id: student.id,
                        subject_id: subject.id,
                        date: row.date,
                        status: &row.status,
                        created_at: Utc::now().naive_utc(),
                    },
                )?;
                summary.processed += 1;
            }

            Ok(summary)
        })
    }

    /// Reads the workbook at `path` and imports its rows. See
    /// [`AttendanceManager::import_rows`].
    pub fn import_workbook(&mut self, path: &Path) -> Result<ImportSummary> {
        let rows = import::read_workbook(path)?;

        tracing::info!(path = %path.display(), rows = rows.len(), "importing workbook");

        let summary = self.import_rows(&rows)?;

        tracing::info!(
            processed = summary.processed,
            students_created = summary.students_created,
            subjects_created = summary.subjects_created,
            duplicates_skipped = summary.duplicates_skipped,
            "import committed"
        );

        Ok(summary)
    }
}

fn insert_student(conn: &mut SqliteConnection, new_student: &NewStudent<'_>) -> Result<Student> {
    diesel::insert_into(students::table)
        .values(new_student)
        .returning(Student::as_returning())
        .get_result(conn)
        .map_err(|err| {
            Error::from_unique_violation(err, || format!("student_id {}", new_student.student_id))
        })
}

fn insert_subject(conn: &mut SqliteConnection, new_subject: &NewSubject<'_>) -> Result<Subject> {
    diesel::insert_into(subjects::table)
        .values(new_subject)
        .returning(Subject::as_returning())
        .get_result(conn)
        .map_err(|err| {
            Error::from_unique_violation(err, || format!("subject code {}", new_subject.code))
        })
}

fn insert_attendance(
    conn: &mut SqliteConnection,
    new_record: &NewAttendanceRecord<'_>,
) -> Result<AttendanceRecord> {
    Ok(diesel::insert_into(attendance_records::table)
        .values(new_record)
        .returning(AttendanceRecord::as_returning())
        .get_result(conn)?)
}

fn find_student(conn: &mut SqliteConnection, natural_id: &str) -> Result<Option<Student>> {
    Ok(students::table
        .filter(students::student_id.eq(natural_id))
        .select(Student::as_select())
        .first(conn)
        .optional()?)
}

fn find_subject(conn: &mut SqliteConnection, subject_code: &str) -> Result<Option<Subject>> {
    Ok(subjects::table
        .filter(subjects::code.eq(subject_code))
        .select(Subject::as_select())
        .first(conn)
        .optional()?)
}

fn attendance_exists(
    conn: &mut SqliteConnection,
    student_key: i32,
    subject_key: i32,
    on: NaiveDate,
) -> Result<bool> {
    let count: i64 = attendance_records::table
        .filter(attendance_records::student_id.eq(student_key))
        .filter(attendance_records::subject_id.eq(subject_key))
        .filter(attendance_records::date.eq(on))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}
