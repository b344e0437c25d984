/// Packet types understood by the render server.
///
/// The numeric values are the wire tags and must match the server build.
/// Every request is answered with a packet of the same type on success;
/// any other reply type carries an error string.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    None = 0,

    GetLdbCategories,
    GetLdbMaterialPreview,
    GetLdbMaterial,

    Error,
    Description,
    SetLicenseData,
    Reset,
    Start,
    Update,
    Pause,
    GetImage,
    GetSamples,

    LoadGpu,
    LoadKernel,
    LoadThinLensCamera,
    LoadPanoramicCamera,
    LoadSunSky,

    // Named packets: payload starts with a name block
    LoadGlobalMesh,
    DelGlobalMesh,
    LoadLocalMesh,
    DelLocalMesh,
    LoadGeoMaterial,
    DelGeoMaterial,
    LoadGeoScatter,
    DelGeoScatter,

    LoadDiffuseMaterial,
    LoadGlossyMaterial,
    LoadSpecularMaterial,
    LoadMixMaterial,
    LoadPortalMaterial,
    DelMaterial,

    LoadFloatTexture,
    LoadRgbSpectrumTexture,
    LoadGaussianSpectrumTexture,
    LoadChecksTexture,
    LoadMarbleTexture,
    LoadRidgedFractalTexture,
    LoadSawWaveTexture,
    LoadSineWaveTexture,
    LoadTriangleWaveTexture,
    LoadTurbulenceTexture,
    LoadClampTexture,
    LoadCosineMixTexture,
    LoadInvertTexture,
    LoadMixTexture,
    LoadMultiplyTexture,
    LoadImageTexture,
    LoadAlphaImageTexture,
    LoadFloatImageTexture,
    LoadFalloffTexture,
    LoadColorCorrectTexture,
    LoadDirtTexture,
    DelTexture,

    LoadBlackbodyEmission,
    LoadTextureEmission,
    DelEmission,

    LoadScaleTransform,
    LoadRotationTransform,
    LoadFullTransform,
    DelTransform,

    LoadAbsorptionMedium,
    LoadScatteringMedium,
    DelMedium,
}

impl PacketType {
    pub const FIRST_NAMED: PacketType = PacketType::LoadGlobalMesh;
    pub const LAST_NAMED: PacketType = PacketType::DelMedium;

    const ALL: [PacketType; 64] = [
        PacketType::None,
        PacketType::GetLdbCategories,
        PacketType::GetLdbMaterialPreview,
        PacketType::GetLdbMaterial,
        PacketType::Error,
        PacketType::Description,
        PacketType::SetLicenseData,
        PacketType::Reset,
        PacketType::Start,
        PacketType::Update,
        PacketType::Pause,
        PacketType::GetImage,
        PacketType::GetSamples,
        PacketType::LoadGpu,
        PacketType::LoadKernel,
        PacketType::LoadThinLensCamera,
        PacketType::LoadPanoramicCamera,
        PacketType::LoadSunSky,
        PacketType::LoadGlobalMesh,
        PacketType::DelGlobalMesh,
        PacketType::LoadLocalMesh,
        PacketType::DelLocalMesh,
        PacketType::LoadGeoMaterial,
        PacketType::DelGeoMaterial,
        PacketType::LoadGeoScatter,
        PacketType::DelGeoScatter,
        PacketType::LoadDiffuseMaterial,
        PacketType::LoadGlossyMaterial,
        PacketType::LoadSpecularMaterial,
        PacketType::LoadMixMaterial,
        PacketType::LoadPortalMaterial,
        PacketType::DelMaterial,
        PacketType::LoadFloatTexture,
        PacketType::LoadRgbSpectrumTexture,
        PacketType::LoadGaussianSpectrumTexture,
        PacketType::LoadChecksTexture,
        PacketType::LoadMarbleTexture,
        PacketType::LoadRidgedFractalTexture,
        PacketType::LoadSawWaveTexture,
        PacketType::LoadSineWaveTexture,
        PacketType::LoadTriangleWaveTexture,
        PacketType::LoadTurbulenceTexture,
        PacketType::LoadClampTexture,
        PacketType::LoadCosineMixTexture,
        PacketType::LoadInvertTexture,
        PacketType::LoadMixTexture,
        PacketType::LoadMultiplyTexture,
        PacketType::LoadImageTexture,
        PacketType::LoadAlphaImageTexture,
        PacketType::LoadFloatImageTexture,
        PacketType::LoadFalloffTexture,
        PacketType::LoadColorCorrectTexture,
        PacketType::LoadDirtTexture,
        PacketType::DelTexture,
        PacketType::LoadBlackbodyEmission,
        PacketType::LoadTextureEmission,
        PacketType::DelEmission,
        PacketType::LoadScaleTransform,
        PacketType::LoadRotationTransform,
        PacketType::LoadFullTransform,
        PacketType::DelTransform,
        PacketType::LoadAbsorptionMedium,
        PacketType::LoadScatteringMedium,
        PacketType::DelMedium,
    ];

    /// Wire tag of this packet type
    pub fn tag(self) -> u64 {
        self as u64
    }

    /// Decode a wire tag. Unknown tags map to `PacketType::None`.
    pub fn from_tag(tag: u64) -> PacketType {
        usize::try_from(tag)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(PacketType::None)
    }

    /// Whether the payload of this packet type starts with a name block
    pub fn is_named(self) -> bool {
        let tag = self.tag();
        tag >= Self::FIRST_NAMED.tag() && tag <= Self::LAST_NAMED.tag()
    }

    /// Mesh load packet for the global or local path
    pub fn load_mesh(global: bool) -> PacketType {
        if global {
            PacketType::LoadGlobalMesh
        } else {
            PacketType::LoadLocalMesh
        }
    }

    /// Mesh delete packet for the global or local path
    pub fn delete_mesh(global: bool) -> PacketType {
        if global {
            PacketType::DelGlobalMesh
        } else {
            PacketType::DelLocalMesh
        }
    }
}
