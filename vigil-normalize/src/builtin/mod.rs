//! Builtin vendor normalizers.
//!
//! One module per supported export format. VA: `manual`, `nessus`,
//! `cloud_nessus`, and AWS Inspector; HA: AWS Security Hub.

pub mod aws_inspector;
pub mod aws_security_hub;
pub mod cloud_nessus;
pub mod manual;
pub mod nessus;

pub use aws_inspector::AwsInspector;
pub use aws_security_hub::AwsSecurityHub;
pub use cloud_nessus::CloudNessus;
pub use manual::ManualCsv;
pub use nessus::Nessus;
