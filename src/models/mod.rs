mod attendance;
mod contract;
mod department;
mod employee;
mod position;
mod role;
mod salary_history;
mod skill;
mod user;
mod user_token;

pub use attendance::{ATTENDANCE_STATUSES, Attendance, WorkHours};
pub use contract::{CONTRACT_STATUSES, CONTRACT_TYPES, Contract};
pub use department::Department;
pub use employee::{Employee, EmployeeListItem};
pub use position::Position;
pub use role::{ADMIN, MANAGER, Role, USER, UserRole};
pub use salary_history::SalaryHistory;
pub use skill::Skill;
pub use user::{User, UserDetails};
pub use user_token::{TokenPair, UserToken};
