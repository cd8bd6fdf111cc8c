use crate::api::attendance::{CheckInRequest, CheckOutRequest};
use crate::api::employee::{
    CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee,
};
use crate::api::notification::{
    NotificationListResponse, NotificationQuery, UnreadCountQuery,
};
use crate::model::employee::Employee;
use crate::model::notification::{Notification, NotificationKind};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Compliance API",
        version = "1.0.0",
        description = r#"
## Attendance Compliance Service

This API powers attendance tracking and the **attendance-compliance notification engine**
for an HR administration system.

### 🔹 Key Features
- **Attendance Tracking**
  - Daily check-in (with server-side lateness detection) and check-out
- **Compliance Engine**
  - Cron-triggered checks for late arrivals, missing attendance and missing check-outs
  - At-most-once notification dispatch per attendance record
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Notification Inbox**
  - Per-employee notification list, unread counts, read markers

### ⏰ Scheduling
`GET /cron/check-attendance` is meant to be called by an external scheduler every
few minutes; time-of-day windows decide which checks actually run on each tick.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::compliance::check_attendance,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::notification::list_notifications,
        crate::api::notification::unread_count,
        crate::api::notification::mark_read
    ),
    components(
        schemas(
            CheckInRequest,
            CheckOutRequest,
            CreateEmployee,
            UpdateEmployee,
            Employee,
            EmployeeQuery,
            EmployeeListResponse,
            Notification,
            NotificationKind,
            NotificationQuery,
            UnreadCountQuery,
            NotificationListResponse
        )
    ),
    tags(
        (name = "Compliance", description = "Scheduler-triggered attendance compliance checks"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Notification", description = "Notification inbox APIs"),
    )
)]
pub struct ApiDoc;
