//! Built-in provider metadata
//!
//! One registration function per provider. Types listed here get their
//! computed and JSON-string attributes, and their flags, before any user
//! supplied metadata is applied.

use super::{computed, json_string, Flags, SchemaRepository};

pub const AWS_IAM_POLICY: &str = "aws_iam_policy";
pub const AWS_IAM_ROLE: &str = "aws_iam_role";
pub const AWS_IAM_ROLE_POLICY: &str = "aws_iam_role_policy";
pub const AWS_IAM_USER_POLICY: &str = "aws_iam_user_policy";
pub const AWS_INSTANCE: &str = "aws_instance";
pub const AWS_S3_BUCKET: &str = "aws_s3_bucket";
pub const AWS_S3_BUCKET_POLICY: &str = "aws_s3_bucket_policy";
pub const AWS_VPC: &str = "aws_vpc";

pub const GITHUB_BRANCH_PROTECTION: &str = "github_branch_protection";
pub const GITHUB_MEMBERSHIP: &str = "github_membership";
pub const GITHUB_REPOSITORY: &str = "github_repository";
pub const GITHUB_TEAM: &str = "github_team";
pub const GITHUB_TEAM_MEMBERSHIP: &str = "github_team_membership";

pub const GOOGLE_COMPUTE_INSTANCE_GROUP: &str = "google_compute_instance_group";
pub const GOOGLE_COMPUTE_INSTANCE_GROUP_MANAGER: &str = "google_compute_instance_group_manager";

/// Register the metadata of every supported provider.
pub fn register_all(repository: &mut SchemaRepository) {
    register_aws(repository);
    register_github(repository);
    register_google(repository);
}

pub fn register_aws(repository: &mut SchemaRepository) {
    repository.update_schema(
        AWS_IAM_USER_POLICY,
        &[("id", computed), ("name", computed), ("policy", json_string)],
    );
    repository.update_schema(AWS_IAM_POLICY, &[("policy", json_string)]);
    repository.update_schema(AWS_IAM_ROLE_POLICY, &[("policy", json_string)]);
    repository.update_schema(AWS_IAM_ROLE, &[("assume_role_policy", json_string)]);
    repository.update_schema(AWS_S3_BUCKET_POLICY, &[("policy", json_string)]);
    repository.update_schema(
        AWS_S3_BUCKET,
        &[
            ("policy", json_string),
            ("arn", computed),
            ("bucket_domain_name", computed),
            ("region", computed),
            ("tags_all", computed),
        ],
    );
    repository.update_schema(
        AWS_VPC,
        &[
            ("arn", computed),
            ("owner_id", computed),
            ("default_route_table_id", computed),
            ("main_route_table_id", computed),
        ],
    );
    repository.update_schema(
        AWS_INSTANCE,
        &[
            ("arn", computed),
            ("private_ip", computed),
            ("public_ip", computed),
            ("public_dns", computed),
            ("private_dns", computed),
        ],
    );
}

pub fn register_github(repository: &mut SchemaRepository) {
    for ty in [
        GITHUB_BRANCH_PROTECTION,
        GITHUB_MEMBERSHIP,
        GITHUB_TEAM_MEMBERSHIP,
        GITHUB_REPOSITORY,
        GITHUB_TEAM,
    ] {
        repository.update_flags(ty, Flags::DEEP_MODE);
    }
}

pub fn register_google(repository: &mut SchemaRepository) {
    repository.update_schema(
        GOOGLE_COMPUTE_INSTANCE_GROUP,
        &[("self_link", computed), ("fingerprint", computed)],
    );
    repository.update_schema(
        GOOGLE_COMPUTE_INSTANCE_GROUP_MANAGER,
        &[
            ("fingerprint", computed),
            ("instance_group", computed),
            ("self_link", computed),
        ],
    );
}
