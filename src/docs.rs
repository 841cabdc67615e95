use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use scholaris_core::{PaginationMeta, PaginationParams};
use scholaris_models::Requester;
use scholaris_models::Role;
use scholaris_models::attendance::{
    Attendance, AttendanceEntry, AttendanceFilterParams, AttendanceStatus, MarkAttendanceDto,
};
use scholaris_models::auth::{LoginRequest, LoginResponse, NavItem, NavSection, SessionResponse};
use scholaris_models::catalog::{CatalogKind, CatalogRows};
use scholaris_models::class_admins::{
    AssignClassAdminDto, AssignableClassesQuery, ClassAdminAssignment, ClassAdminView,
};
use scholaris_models::classes::{
    AssignTemplateDto, Class, ClassFilterParams, CreateClassDto, PaginatedClassesResponse,
    TemplateAssignment, UpdateClassDto,
};
use scholaris_models::homework::{
    CreateHomeworkDto, Homework, HomeworkFilterParams, HomeworkView, PaginatedHomeworkResponse,
    UpdateHomeworkDto,
};
use scholaris_models::live_classes::{
    BroadcastLiveClassDto, BroadcastResult, CreateLiveClassDto, LiveClass, LiveClassFilterParams,
    LiveClassView, PaginatedLiveClassesResponse, UpdateLiveClassDto,
};
use scholaris_models::permissions::RecordPermissions;
use scholaris_models::schools::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolFilterParams,
};
use scholaris_models::subjects::{
    AssignSubjectsDto, CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams,
    SubjectRename, UpdateSubjectDto,
};
use scholaris_models::timetable::{CreateTimetableEntryDto, TimetableEntry, TimetableFilterParams};
use scholaris_models::users::{
    CreateUserDto, LinkStudentDto, PaginatedUsersResponse, User, UserFilterParams,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_session,
        crate::modules::schools::controller::create_school,
        crate::modules::schools::controller::get_schools,
        crate::modules::schools::controller::get_school,
        crate::modules::schools::controller::delete_school,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::deactivate_user,
        crate::modules::users::controller::get_children,
        crate::modules::users::controller::link_student,
        crate::modules::users::controller::unlink_student,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::templates::controller::list_templates,
        crate::modules::templates::controller::list_school_instances,
        crate::modules::templates::controller::assign_template_to_school,
        crate::modules::templates::controller::rename_template_subject,
        crate::modules::class_admins::controller::assign_class_admin,
        crate::modules::class_admins::controller::get_class_admins,
        crate::modules::class_admins::controller::get_assignable_classes,
        crate::modules::teachers::controller::assign_subjects,
        crate::modules::teachers::controller::get_subjects,
        crate::modules::homework::controller::create_homework,
        crate::modules::homework::controller::get_homework,
        crate::modules::homework::controller::get_homework_by_id,
        crate::modules::homework::controller::update_homework,
        crate::modules::homework::controller::delete_homework,
        crate::modules::live_classes::controller::create_live_class,
        crate::modules::live_classes::controller::broadcast_live_class,
        crate::modules::live_classes::controller::get_live_classes,
        crate::modules::live_classes::controller::get_live_class,
        crate::modules::live_classes::controller::update_live_class,
        crate::modules::live_classes::controller::delete_live_class,
        crate::modules::attendance::controller::mark_attendance,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::timetable::controller::create_entry,
        crate::modules::timetable::controller::get_entries,
        crate::modules::timetable::controller::delete_entry,
    ),
    components(
        schemas(
            Role,
            Requester,
            RecordPermissions,
            LoginRequest,
            LoginResponse,
            NavItem,
            NavSection,
            SessionResponse,
            School,
            CreateSchoolDto,
            SchoolFilterParams,
            PaginatedSchoolsResponse,
            User,
            CreateUserDto,
            UserFilterParams,
            PaginatedUsersResponse,
            LinkStudentDto,
            Class,
            CreateClassDto,
            UpdateClassDto,
            ClassFilterParams,
            PaginatedClassesResponse,
            AssignTemplateDto,
            TemplateAssignment,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            SubjectFilterParams,
            PaginatedSubjectsResponse,
            SubjectRename,
            AssignSubjectsDto,
            CatalogKind,
            CatalogRows,
            ClassAdminAssignment,
            AssignClassAdminDto,
            ClassAdminView,
            AssignableClassesQuery,
            Homework,
            CreateHomeworkDto,
            UpdateHomeworkDto,
            HomeworkFilterParams,
            HomeworkView,
            PaginatedHomeworkResponse,
            LiveClass,
            CreateLiveClassDto,
            UpdateLiveClassDto,
            BroadcastLiveClassDto,
            BroadcastResult,
            LiveClassFilterParams,
            LiveClassView,
            PaginatedLiveClassesResponse,
            Attendance,
            AttendanceStatus,
            AttendanceEntry,
            MarkAttendanceDto,
            AttendanceFilterParams,
            TimetableEntry,
            CreateTimetableEntryDto,
            TimetableFilterParams,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and session"),
        (name = "Schools", description = "School tenants"),
        (name = "Users", description = "Accounts and parent-student links"),
        (name = "Classes", description = "Template and school classes"),
        (name = "Subjects", description = "Template and school subjects"),
        (name = "Templates", description = "Template catalog, assignment to schools and rename propagation"),
        (name = "Class Admins", description = "One administering teacher per class"),
        (name = "Teachers", description = "Teacher subject assignments"),
        (name = "Homework", description = "Homework with ownership-aware edits"),
        (name = "Live Classes", description = "Scheduled live sessions and cross-school broadcast"),
        (name = "Attendance", description = "Daily attendance per student"),
        (name = "Timetable", description = "Weekly class timetable")
    ),
    info(
        title = "Scholaris API",
        version = "0.1.0",
        description = "Multi-tenant school management API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
