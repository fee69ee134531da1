// SPDX-License-Identifier: Apache-2.0

//! Generated gRPC types for the license lookup service, plus the thin
//! conversions between the wire messages and whatever the service crate
//! wants to call its domain types.

pub mod proto {
    tonic::include_proto!("licenselookup.v1");
}

/// The encoded `FileDescriptorSet`, embedded for `tonic-reflection`.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    tonic::include_file_descriptor_set!("license_lookup_descriptor");

pub use proto::{
    license_lookup_client::LicenseLookupClient,
    license_lookup_server::{LicenseLookup, LicenseLookupServer},
    DistributionPoint, GetPackageInfoRequest, GetPackageInfoResponse,
};
