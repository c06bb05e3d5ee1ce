//! Default render endpoint lookup via the MMDevice API.

use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{eConsole, eRender, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator};
use windows::Win32::System::Com::StructuredStorage::{PropVariantClear, PROPVARIANT};
use windows::Win32::System::Com::{CoCreateInstance, CoTaskMemFree, CLSCTX_ALL, STGM_READ};
use windows::Win32::System::Variant::VT_LPWSTR;

use rhythm_core::models::audio_models::AudioEndpoint;
use rhythm_core::models::error::CaptureError;

/// Requires COM to be initialized on the calling thread.
pub(crate) struct EndpointEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl EndpointEnumerator {
    pub(crate) fn new() -> Result<Self, CaptureError> {
        let enumerator: IMMDeviceEnumerator = unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) }
            .map_err(|e| CaptureError::session_init("create_device_enumerator", e))?;
        Ok(Self { enumerator })
    }

    /// The device currently playing console audio. Loopback reads from a
    /// render endpoint, never a capture one.
    pub(crate) fn default_render_device(&self) -> Result<IMMDevice, CaptureError> {
        unsafe { self.enumerator.GetDefaultAudioEndpoint(eRender, eConsole) }
            .map_err(|e| CaptureError::session_init("get_default_audio_endpoint", e))
    }

    pub(crate) fn default_render_endpoint(&self) -> Result<AudioEndpoint, CaptureError> {
        let device = self.default_render_device()?;
        Ok(describe(&device))
    }
}

pub(crate) fn describe(device: &IMMDevice) -> AudioEndpoint {
    let id = unsafe { device.GetId() }
        .map(|pwstr| unsafe {
            let id = pwstr.to_string().unwrap_or_default();
            CoTaskMemFree(Some(pwstr.0 as *const _));
            id
        })
        .unwrap_or_default();
    let name = friendly_name(device).unwrap_or_else(|| "System Audio (Loopback)".into());

    AudioEndpoint {
        id,
        name,
        is_default: true,
    }
}

/// Read `PKEY_Device_FriendlyName` from the device's property store.
fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;

        let mut prop_variant = PROPVARIANT::default();
        store.GetValue(&PKEY_Device_FriendlyName, &mut prop_variant).ok()?;

        let name = if prop_variant.Anonymous.Anonymous.vt == VT_LPWSTR {
            let pwsz = prop_variant.Anonymous.Anonymous.Anonymous.pwszVal;
            if pwsz.is_null() {
                None
            } else {
                pwsz.to_string().ok()
            }
        } else {
            None
        };

        PropVariantClear(&mut prop_variant).ok();
        name
    }
}
