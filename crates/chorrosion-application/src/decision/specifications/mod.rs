// SPDX-License-Identifier: GPL-3.0-or-later
mod availability;
mod custom_format_allowed;
mod cutoff;
mod delay;
mod deleted_file;
mod history;
mod monitored;
mod proper;
mod quality_allowed;
mod repack;
mod upgrade_disk;

#[cfg(test)]
pub(crate) mod test_support;

pub use availability::AvailabilitySpecification;
pub use custom_format_allowed::CustomFormatAllowedByProfileSpecification;
pub use cutoff::CutoffSpecification;
pub use delay::DelaySpecification;
pub use deleted_file::DeletedFileSpecification;
pub use history::HistorySpecification;
pub use monitored::MonitoredSpecification;
pub use proper::ProperSpecification;
pub use quality_allowed::QualityAllowedByProfileSpecification;
pub use repack::RepackSpecification;
pub use upgrade_disk::UpgradeDiskSpecification;
