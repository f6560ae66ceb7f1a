//! Switching of the active PID and rate profiles, manually or based on the battery's cell count.

use log::*;

use crate::config::DeviceConfig;
use crate::platform::Platform;
use crate::settings::*;
use crate::storage::ConfigStorage;

impl<S: ConfigStorage, P: Platform> DeviceConfig<S, P> {
    /// Activates PID profile `index`. The acknowledgment is emitted with `index + 1` pulses even if
    /// the index is out of range and the profile was not changed.
    pub fn select_pid_profile(&mut self, index: u8) {
        if (index as usize) < PID_PROFILE_COUNT {
            self.settings.system.pid_profile_index = index;
            self.reload_pid_profile();

            let profile = &self.settings.pid_profiles[self.active_pid_profile];
            self.platform.reinitialize_control_law(profile);
            self.platform.init_esc_endpoints(&self.settings.motor);
            info!("Switched to PID profile {}.", index);
        } else {
            warn!("Ignoring invalid PID profile {}.", index);
        }

        self.platform.emit_acknowledgment(index as u16 + 1);
    }

    /// Switches to the profile matching the detected battery cell count.
    ///
    /// Nothing happens if the active profile already matches or is marked to stay. Otherwise the
    /// other profiles are scanned in order starting after the active one: an exact match wins, the
    /// first profile marked to stay is used as fallback.
    pub fn auto_select_pid_profile_by_cell_count(&mut self, cells: u8) {
        let current = self.active_pid_profile;
        let matches = |selector: i8| i16::from(selector) == i16::from(cells);

        let selector = self.settings.pid_profiles[current].auto_profile_cell_count;
        if matches(selector) || selector == AUTO_PROFILE_CELL_COUNT_STAY {
            return;
        }

        let mut candidate = None;
        let mut index = (current + 1) % PID_PROFILE_COUNT;
        while index != current {
            let selector = self.settings.pid_profiles[index].auto_profile_cell_count;
            if matches(selector) {
                candidate = Some(index);
                break;
            }

            if candidate.is_none() && selector == AUTO_PROFILE_CELL_COUNT_STAY {
                candidate = Some(index);
            }

            index = (index + 1) % PID_PROFILE_COUNT;
        }

        if let Some(index) = candidate {
            debug!("Selecting PID profile {} for {} cells.", index, cells);
            self.select_pid_profile(index as u8);
        }
    }

    /// Activates rate profile `index`, ignoring invalid indices.
    pub fn select_rate_profile(&mut self, index: u8) {
        if (index as usize) >= CONTROL_RATE_PROFILE_COUNT {
            warn!("Ignoring invalid rate profile {}.", index);
            return;
        }

        self.settings.system.active_rate_profile = index;
        self.reload_rate_profile();

        let profile = &self.settings.rate_profiles[self.active_rate_profile];
        self.platform.load_rate_profile(self.active_rate_profile, profile);
        self.platform.init_rc_processing();
        info!("Switched to rate profile {}.", index);
    }
}
