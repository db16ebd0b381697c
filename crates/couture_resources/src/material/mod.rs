mod basic;
mod family;
mod phong;
mod physical;
mod property;

pub use basic::{GuideLineMaterial, LineBasicMaterial, MeshBasicMaterial};
pub use family::MaterialFamily;
pub use phong::MeshPhongMaterial;
pub use physical::MeshPhysicalMaterial;
pub use property::{PropertyKey, PropertyKind, PropertyMap, PropertyValue, UpdateMode};

use std::sync::atomic::{AtomicU64, Ordering};

use couture_core::{Color, Error, Result, TextureHandle};
use uuid::Uuid;

static NEXT_MATERIAL_VERSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Render state shared by every material kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSettings {
    pub transparent: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    pub depth_compare: wgpu::CompareFunction,
    pub side: Side,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            transparent: false,
            depth_write: true,
            depth_test: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            side: Side::Front,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialData {
    Physical(MeshPhysicalMaterial),
    Phong(MeshPhongMaterial),
    Basic(MeshBasicMaterial),
    Line(LineBasicMaterial),
    GuideLine(GuideLineMaterial),
}

impl MaterialData {
    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        match self {
            Self::Physical(_) => "mesh_physical",
            Self::Phong(_) => "mesh_phong",
            Self::Basic(_) => "mesh_basic",
            Self::Line(_) => "line_basic",
            Self::GuideLine(_) => "guide_line",
        }
    }
}

/// A material instance.
///
/// Physical and Phong materials expose their parameters through the
/// property API ([`get`](Self::get) / [`set`](Self::set)), which is what the
/// material registry drives. The other kinds are fixed-function helpers.
#[derive(Debug)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub data: MaterialData,
    pub settings: MaterialSettings,
    version: AtomicU64,
}

impl Clone for Material {
    /// Clones get a fresh identity.
    fn clone(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: self.name.clone(),
            data: self.data.clone(),
            settings: self.settings,
            version: AtomicU64::new(NEXT_MATERIAL_VERSION.fetch_add(1, Ordering::Relaxed)),
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            data,
            settings: MaterialSettings::default(),
            version: AtomicU64::new(NEXT_MATERIAL_VERSION.fetch_add(1, Ordering::Relaxed)),
        }
    }

    #[must_use]
    pub fn new_physical(color: Color) -> Self {
        Self::from(MeshPhysicalMaterial::new(color))
    }

    #[must_use]
    pub fn new_phong(color: Color) -> Self {
        Self::from(MeshPhongMaterial::new(color))
    }

    #[must_use]
    pub fn new_basic(color: Color) -> Self {
        Self::from(MeshBasicMaterial::new(color))
    }

    #[must_use]
    pub fn new_line(color: Color) -> Self {
        Self::from(LineBasicMaterial::new(color))
    }

    /// Default material of a family.
    #[must_use]
    pub fn new_family(family: MaterialFamily) -> Self {
        match family {
            MaterialFamily::Physical => Self::from(MeshPhysicalMaterial::default()),
            MaterialFamily::Phong => Self::from(MeshPhongMaterial::default()),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: MaterialSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }

    pub fn mark_dirty(&self) {
        self.version.store(
            NEXT_MATERIAL_VERSION.fetch_add(1, Ordering::Relaxed),
            Ordering::Relaxed,
        );
    }

    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        self.data.shader_name()
    }

    /// Family of a registry-managed material, `None` for helper kinds.
    #[must_use]
    pub fn family(&self) -> Option<MaterialFamily> {
        match &self.data {
            MaterialData::Physical(_) => Some(MaterialFamily::Physical),
            MaterialData::Phong(_) => Some(MaterialFamily::Phong),
            _ => None,
        }
    }

    // ========== Typed access ==========

    #[must_use]
    pub fn as_physical(&self) -> Option<&MeshPhysicalMaterial> {
        match &self.data {
            MaterialData::Physical(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_physical_mut(&mut self) -> Option<&mut MeshPhysicalMaterial> {
        match &mut self.data {
            MaterialData::Physical(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_phong(&self) -> Option<&MeshPhongMaterial> {
        match &self.data {
            MaterialData::Phong(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_phong_mut(&mut self) -> Option<&mut MeshPhongMaterial> {
        match &mut self.data {
            MaterialData::Phong(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_guide_line(&self) -> Option<&GuideLineMaterial> {
        match &self.data {
            MaterialData::GuideLine(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_guide_line_mut(&mut self) -> Option<&mut GuideLineMaterial> {
        match &mut self.data {
            MaterialData::GuideLine(m) => Some(m),
            _ => None,
        }
    }

    /// Environment map binding, for every kind that can carry one.
    #[must_use]
    pub fn env_map(&self) -> Option<TextureHandle> {
        match &self.data {
            MaterialData::Physical(m) => m.env_map,
            MaterialData::Phong(m) => m.env_map,
            MaterialData::Basic(m) => m.env_map,
            _ => None,
        }
    }

    #[must_use]
    pub fn map(&self) -> Option<TextureHandle> {
        match &self.data {
            MaterialData::Physical(m) => m.map,
            MaterialData::Phong(m) => m.map,
            MaterialData::Basic(m) => m.map,
            _ => None,
        }
    }

    pub fn set_map(&mut self, map: Option<TextureHandle>) {
        match &mut self.data {
            MaterialData::Physical(m) => m.map = map,
            MaterialData::Phong(m) => m.map = map,
            MaterialData::Basic(m) => m.map = map,
            _ => return,
        }
        self.mark_dirty();
    }

    /// Binds an environment map on any kind that can carry one.
    pub fn set_env_map(&mut self, env_map: Option<TextureHandle>) {
        match &mut self.data {
            MaterialData::Physical(m) => m.env_map = env_map,
            MaterialData::Phong(m) => m.env_map = env_map,
            MaterialData::Basic(m) => m.env_map = env_map,
            _ => return,
        }
        self.mark_dirty();
    }

    // ========== Property API ==========

    /// Reads a schema property. `None` when the family lacks it.
    #[must_use]
    pub fn get(&self, key: PropertyKey) -> Option<PropertyValue> {
        use PropertyKey as K;
        use PropertyValue as V;
        match &self.data {
            MaterialData::Physical(m) => Some(match key {
                K::EnvMap => V::EnvMap(m.env_map),
                K::FlatShading => V::Bool(m.flat_shading),
                K::Metalness => V::Scalar(m.metalness),
                K::Roughness => V::Scalar(m.roughness),
                K::Wireframe => V::Bool(m.wireframe),
                K::Color => V::Color(m.color),
                K::Clearcoat => V::Scalar(m.clearcoat),
                K::Reflectivity => V::Scalar(m.reflectivity),
                K::Shininess => return None,
            }),
            MaterialData::Phong(m) => Some(match key {
                K::EnvMap => V::EnvMap(m.env_map),
                K::FlatShading => V::Bool(m.flat_shading),
                K::Wireframe => V::Bool(m.wireframe),
                K::Color => V::Color(m.color),
                K::Reflectivity => V::Scalar(m.reflectivity),
                K::Shininess => V::Scalar(m.shininess),
                K::Metalness | K::Roughness | K::Clearcoat => return None,
            }),
            _ => None,
        }
    }

    /// Writes a schema property.
    ///
    /// Scalars are clamped to the schema range. Fails with
    /// [`Error::UnsupportedProperty`] when the family lacks `key` and with
    /// [`Error::PropertyType`] when the value has the wrong shape.
    pub fn set(&mut self, key: PropertyKey, value: PropertyValue) -> Result<()> {
        let unsupported = |family: &'static str| Error::UnsupportedProperty {
            property: key.name(),
            family,
        };
        let Some(family) = self.family() else {
            return Err(unsupported(self.shader_name()));
        };
        if !family.supports(key) {
            return Err(unsupported(family.name()));
        }

        let kind = key.kind();
        if !value.matches(kind) {
            return Err(Error::PropertyType {
                property: key.name(),
                expected: match kind {
                    PropertyKind::Color => "color",
                    PropertyKind::Toggle => "boolean",
                    PropertyKind::Scalar { .. } => "number",
                    PropertyKind::Texture => "texture",
                },
            });
        }

        let scalar = match (value, kind) {
            (PropertyValue::Scalar(v), PropertyKind::Scalar { min, max, .. }) => v.clamp(min, max),
            _ => 0.0,
        };

        use PropertyKey as K;
        use PropertyValue as V;
        match (&mut self.data, key, value) {
            (MaterialData::Physical(m), K::EnvMap, V::EnvMap(h)) => m.env_map = h,
            (MaterialData::Physical(m), K::FlatShading, V::Bool(b)) => m.flat_shading = b,
            (MaterialData::Physical(m), K::Wireframe, V::Bool(b)) => m.wireframe = b,
            (MaterialData::Physical(m), K::Color, V::Color(c)) => m.color = c,
            (MaterialData::Physical(m), K::Metalness, _) => m.metalness = scalar,
            (MaterialData::Physical(m), K::Roughness, _) => m.roughness = scalar,
            (MaterialData::Physical(m), K::Clearcoat, _) => m.clearcoat = scalar,
            (MaterialData::Physical(m), K::Reflectivity, _) => m.reflectivity = scalar,

            (MaterialData::Phong(m), K::EnvMap, V::EnvMap(h)) => m.env_map = h,
            (MaterialData::Phong(m), K::FlatShading, V::Bool(b)) => m.flat_shading = b,
            (MaterialData::Phong(m), K::Wireframe, V::Bool(b)) => m.wireframe = b,
            (MaterialData::Phong(m), K::Color, V::Color(c)) => m.color = c,
            (MaterialData::Phong(m), K::Shininess, _) => m.shininess = scalar,
            (MaterialData::Phong(m), K::Reflectivity, _) => m.reflectivity = scalar,

            // Schema and shape were checked above.
            _ => return Err(unsupported(family.name())),
        }
        self.mark_dirty();
        Ok(())
    }

    /// Every schema property with its current value.
    #[must_use]
    pub fn properties(&self) -> PropertyMap {
        let Some(family) = self.family() else {
            return PropertyMap::new();
        };
        family
            .schema()
            .iter()
            .filter_map(|k| self.get(*k).map(|v| (*k, v)))
            .collect()
    }

    /// Builds a `family` material from the entries of `props` it supports.
    ///
    /// Missing properties keep the family's construction defaults;
    /// unsupported or mistyped entries are skipped.
    #[must_use]
    pub fn from_properties(family: MaterialFamily, props: &PropertyMap) -> Self {
        let mut material = Self::new_family(family);
        for (key, value) in family.project(props) {
            if let Err(e) = material.set(key, value) {
                log::debug!("from_properties: skipping {key}: {e}");
            }
        }
        material
    }
}

impl From<MeshPhysicalMaterial> for Material {
    fn from(data: MeshPhysicalMaterial) -> Self {
        Self::new(MaterialData::Physical(data))
    }
}

impl From<MeshPhongMaterial> for Material {
    fn from(data: MeshPhongMaterial) -> Self {
        Self::new(MaterialData::Phong(data))
    }
}

impl From<MeshBasicMaterial> for Material {
    fn from(data: MeshBasicMaterial) -> Self {
        Self::new(MaterialData::Basic(data))
    }
}

impl From<LineBasicMaterial> for Material {
    fn from(data: LineBasicMaterial) -> Self {
        Self::new(MaterialData::Line(data))
    }
}

impl From<GuideLineMaterial> for Material {
    fn from(data: GuideLineMaterial) -> Self {
        Self::new(MaterialData::GuideLine(data)).with_settings(MaterialSettings {
            transparent: true,
            ..MaterialSettings::default()
        })
    }
}

impl Material {
    /// Front layer of a guide tube: regular depth testing.
    #[must_use]
    pub fn new_guide_front() -> Self {
        Self::from(GuideLineMaterial::new(1.0)).with_name("guide front")
    }

    /// Back layer of a guide tube: drawn only where occluded, faded.
    #[must_use]
    pub fn new_guide_back(opacity: f32) -> Self {
        Self::from(GuideLineMaterial::new(opacity))
            .with_name("guide back")
            .with_settings(MaterialSettings {
                transparent: true,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Greater,
                ..MaterialSettings::default()
            })
    }
}
