//! Component factories.
//!
//! Each `create_*` call obtains an entity, names it, inserts the resource
//! record and the component wrapper, and for scene components creates the
//! transform node and a membership entry set to `INVALID_VID`. Validation
//! happens before the entity is allocated, so a failed call leaves nothing
//! behind.

use glam::Vec3;

use crate::core::{Component, ComponentKind, INVALID_VID, Vid};
use crate::errors::{RegistryError, Result};
use crate::native::{BufferUsage, NativeComponent, NativeMaterialInstanceKey, NativeMaterialKey};
use crate::records::{
    Aabb, ActorRecord, ActorVariant, AssetRecord, CameraRecord, FontRecord, GeometryRecord,
    LightKind, LightRecord, MaterialInstanceRecord, MaterialRecord, Ownership, Primitive,
    PrimitiveTopology, Projection, RenderPathRecord, RenderTarget, SceneRecord, ShadingModel,
    SkeletonRecord, SpriteParams, TextParams, TextureFormat, TextureRecord,
};
use crate::world::{SystemResources, World};

/// CPU-side description of one geometry primitive.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveDesc {
    pub positions: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
    pub topology: PrimitiveTopology,
}

impl PrimitiveDesc {
    #[must_use]
    pub fn triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
            topology: PrimitiveTopology::TriangleList,
        }
    }
}

const VERTEX_STRIDE: u64 = 12;
const INDEX_STRIDE: u64 = 4;

impl World {
    // ========================================================================
    // Entity registration
    // ========================================================================

    /// Allocates (or validates) the entity, names it and inserts the wrapper.
    fn register(&mut self, name: &str, kind: ComponentKind, entity: Option<Vid>) -> Result<Vid> {
        let vid = match entity {
            Some(vid) => {
                if !self.engine.is_alive(vid) {
                    return Err(RegistryError::EntityNotAlive(vid));
                }
                if self.components.contains_key(&vid) || self.engine.names.has(vid) {
                    return Err(RegistryError::AlreadyRegistered(vid));
                }
                vid
            }
            None => self.engine.entities.create()?,
        };

        self.engine.names.create_name_comp(vid, name);
        self.components.insert(vid, Component::new(vid, kind));
        log::debug!("Created {} '{name}' ({vid:?})", kind.as_str());
        Ok(vid)
    }

    fn register_scene_component(
        &mut self,
        name: &str,
        kind: ComponentKind,
        entity: Option<Vid>,
    ) -> Result<Vid> {
        let vid = self.register(name, kind, entity)?;
        self.engine.transforms.create(vid);
        match kind {
            ComponentKind::Camera => {
                self.engine.add_component(vid, NativeComponent::Camera);
                self.camera_scene.insert(vid, INVALID_VID);
            }
            ComponentKind::Light => {
                self.engine.add_component(vid, NativeComponent::Light);
                self.light_scene.insert(vid, INVALID_VID);
            }
            _ => {
                self.engine.add_component(vid, NativeComponent::Renderable);
                self.actor_scene.insert(vid, INVALID_VID);
            }
        }
        Ok(vid)
    }

    fn ensure_kind_or_invalid(&self, vid: Vid, expected: ComponentKind) -> Result<()> {
        if vid.is_valid() {
            self.expect_kind(vid, expected)
        } else {
            Ok(())
        }
    }

    /// Allocates a bare entity with no name, transform or wrapper, for use
    /// with [`create_actor_for_entity`](Self::create_actor_for_entity).
    pub fn create_entity(&mut self) -> Result<Vid> {
        self.engine.entities.create()
    }

    // ========================================================================
    // Scene & scene components
    // ========================================================================

    pub fn create_scene(&mut self, name: &str) -> Result<Vid> {
        let vid = self.register(name, ComponentKind::Scene, None)?;
        let native = self.engine.create_scene();
        self.scenes.insert(vid, SceneRecord { native });
        Ok(vid)
    }

    pub fn create_camera(&mut self, name: &str, projection: Projection) -> Result<Vid> {
        let vid = self.register_scene_component(name, ComponentKind::Camera, None)?;
        self.cameras.insert(
            vid,
            CameraRecord {
                projection,
                helper_geometry: INVALID_VID,
            },
        );
        Ok(vid)
    }

    pub fn create_light(&mut self, name: &str, kind: LightKind) -> Result<Vid> {
        let vid = self.register_scene_component(name, ComponentKind::Light, None)?;
        self.lights.insert(vid, LightRecord::new(kind));
        Ok(vid)
    }

    /// Creates a mesh actor. `geometry` and `material_instances` may be
    /// `INVALID_VID`; anything else must name a live record of that kind.
    pub fn create_actor(
        &mut self,
        name: &str,
        geometry: Vid,
        material_instances: &[Vid],
    ) -> Result<Vid> {
        self.create_actor_impl(name, None, geometry, material_instances)
    }

    /// Like [`create_actor`](Self::create_actor), but registers an entity the
    /// caller already allocated. The entity must be alive and unnamed.
    pub fn create_actor_for_entity(
        &mut self,
        entity: Vid,
        name: &str,
        geometry: Vid,
        material_instances: &[Vid],
    ) -> Result<Vid> {
        self.create_actor_impl(name, Some(entity), geometry, material_instances)
    }

    fn create_actor_impl(
        &mut self,
        name: &str,
        entity: Option<Vid>,
        geometry: Vid,
        material_instances: &[Vid],
    ) -> Result<Vid> {
        self.ensure_kind_or_invalid(geometry, ComponentKind::Geometry)?;
        for &mi in material_instances {
            self.ensure_kind_or_invalid(mi, ComponentKind::MaterialInstance)?;
        }

        let vid = self.register_scene_component(name, ComponentKind::Actor, entity)?;
        let mut record = ActorRecord::new(ActorVariant::Mesh);
        record.geometry = geometry;
        record.material_instances = material_instances.to_vec();
        self.actors.insert(vid, record);
        Ok(vid)
    }

    pub fn create_sprite_actor(&mut self, name: &str, sprite: SpriteParams) -> Result<Vid> {
        self.ensure_kind_or_invalid(sprite.texture, ComponentKind::Texture)?;
        let vid = self.register_scene_component(name, ComponentKind::SpriteActor, None)?;
        self.actors
            .insert(vid, ActorRecord::new(ActorVariant::Sprite(sprite)));
        Ok(vid)
    }

    pub fn create_text_sprite_actor(&mut self, name: &str, text: TextParams) -> Result<Vid> {
        self.ensure_kind_or_invalid(text.font, ComponentKind::Font)?;
        let vid = self.register_scene_component(name, ComponentKind::TextSpriteActor, None)?;
        self.actors
            .insert(vid, ActorRecord::new(ActorVariant::Text(text)));
        Ok(vid)
    }

    /// Allocates a bare transform node (a skeleton bone). Bones carry a name
    /// and a transform but no component wrapper.
    pub fn create_bone(&mut self, name: &str, parent: Vid) -> Result<Vid> {
        if parent.is_valid() && !self.engine.transforms.has(parent) {
            return Err(RegistryError::NotFound(parent));
        }
        let vid = self.engine.entities.create()?;
        self.engine.names.create_name_comp(vid, name);
        self.engine.transforms.create(vid);
        if parent.is_valid() {
            self.engine.transforms.set_parent(vid, Some(parent));
        }
        Ok(vid)
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub fn create_geometry(&mut self, name: &str, primitives: &[PrimitiveDesc]) -> Result<Vid> {
        self.create_geometry_with(name, primitives, Ownership::USER)
    }

    fn create_geometry_with(
        &mut self,
        name: &str,
        primitives: &[PrimitiveDesc],
        ownership: Ownership,
    ) -> Result<Vid> {
        let vid = self.register(name, ComponentKind::Geometry, None)?;

        let mut aabb = Aabb::EMPTY;
        let mut records = Vec::with_capacity(primitives.len());
        for desc in primitives {
            let vertex_count = desc.positions.len() as u32;
            let vertex_buffer = self.engine.resources.create_buffer(
                BufferUsage::Vertex,
                u64::from(vertex_count) * VERTEX_STRIDE,
            );
            let (index_buffer, index_count) = match &desc.indices {
                Some(indices) => {
                    let count = indices.len() as u32;
                    let key = self
                        .engine
                        .resources
                        .create_buffer(BufferUsage::Index, u64::from(count) * INDEX_STRIDE);
                    (Some(key), count)
                }
                None => (None, 0),
            };
            aabb = aabb.union(&Aabb::from_points(&desc.positions));
            records.push(Primitive {
                vertex_buffer,
                index_buffer,
                vertex_count,
                index_count,
                topology: desc.topology,
            });
        }

        self.geometries.insert(
            vid,
            GeometryRecord {
                primitives: records,
                aabb,
                ownership,
            },
        );
        Ok(vid)
    }

    pub fn create_material(&mut self, name: &str, shading_model: ShadingModel) -> Result<Vid> {
        self.create_material_with(name, shading_model, Ownership::USER)
    }

    fn create_material_with(
        &mut self,
        name: &str,
        shading_model: ShadingModel,
        ownership: Ownership,
    ) -> Result<Vid> {
        let native = self.engine.resources.create_material(name);
        self.register_material(name, native, shading_model, ownership)
            .inspect_err(|_| {
                self.engine.resources.materials.remove(native);
            })
    }

    /// Registers an existing native material under a new VID.
    ///
    /// Registering the same native material twice is tolerated and logged.
    pub fn register_material(
        &mut self,
        name: &str,
        native: NativeMaterialKey,
        shading_model: ShadingModel,
        ownership: Ownership,
    ) -> Result<Vid> {
        let existing = self.find_material_vid(native);
        if existing.is_valid() && self.settings().warn_on_duplicate_registration {
            log::warn!("Native material of '{name}' is already registered as {existing:?}");
        }
        let vid = self.register(name, ComponentKind::Material, None)?;
        self.materials.insert(
            vid,
            MaterialRecord {
                native,
                shading_model,
                ownership,
            },
        );
        Ok(vid)
    }

    pub fn create_material_instance(&mut self, name: &str, material: Vid) -> Result<Vid> {
        self.create_material_instance_with(name, material, Ownership::USER)
    }

    fn create_material_instance_with(
        &mut self,
        name: &str,
        material: Vid,
        ownership: Ownership,
    ) -> Result<Vid> {
        self.expect_kind(material, ComponentKind::Material)?;
        let Some(material_native) = self.materials.get(&material).map(|m| m.native) else {
            return Err(RegistryError::InvariantViolation(format!(
                "material {material:?} has a wrapper but no record"
            )));
        };
        let native = self
            .engine
            .resources
            .create_material_instance(material_native);
        self.register_material_instance(name, native, material, ownership)
            .inspect_err(|_| {
                self.engine.resources.material_instances.remove(native);
            })
    }

    /// Registers an existing native material instance derived from
    /// `material`. Duplicates are tolerated and logged.
    pub fn register_material_instance(
        &mut self,
        name: &str,
        native: NativeMaterialInstanceKey,
        material: Vid,
        ownership: Ownership,
    ) -> Result<Vid> {
        self.expect_kind(material, ComponentKind::Material)?;
        let existing = self.find_material_instance_vid(native);
        if existing.is_valid() && self.settings().warn_on_duplicate_registration {
            log::warn!("Native material instance of '{name}' is already registered as {existing:?}");
        }
        let vid = self.register(name, ComponentKind::MaterialInstance, None)?;
        self.material_instances.insert(
            vid,
            MaterialInstanceRecord {
                native,
                material,
                textures: std::collections::BTreeMap::new(),
                params: std::collections::BTreeMap::new(),
                ownership,
            },
        );
        Ok(vid)
    }

    pub fn create_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<Vid> {
        self.create_texture_with(name, width, height, format, Ownership::USER)
    }

    fn create_texture_with(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        ownership: Ownership,
    ) -> Result<Vid> {
        let vid = self.register(name, ComponentKind::Texture, None)?;
        let native = self.engine.resources.create_texture(width, height);
        self.textures.insert(
            vid,
            TextureRecord {
                native,
                width,
                height,
                format,
                assigned_mis: rustc_hash::FxHashSet::default(),
                ownership,
            },
        );
        Ok(vid)
    }

    pub fn create_font(&mut self, name: &str, source: &str, size: f32) -> Result<Vid> {
        let vid = self.register(name, ComponentKind::Font, None)?;
        let native = self.engine.resources.create_font(source);
        self.fonts.insert(
            vid,
            FontRecord {
                native,
                source: source.to_string(),
                size,
                ownership: Ownership::USER,
            },
        );
        Ok(vid)
    }

    /// Creates a skeleton over existing bone nodes. The first bone is the
    /// root; each bone keeps the name it was created with.
    pub fn create_skeleton(&mut self, name: &str, bones: &[Vid]) -> Result<Vid> {
        for &bone in bones {
            if !self.engine.transforms.has(bone) {
                return Err(RegistryError::NotFound(bone));
            }
        }
        let vid = self.register(name, ComponentKind::Skeleton, None)?;
        let mut record = SkeletonRecord::new(Ownership::USER);
        for &bone in bones {
            let bone_name = self.engine.names.get_name(bone).unwrap_or_default();
            record.bones.insert(bone, bone_name.to_string());
        }
        record.root_bone = bones.first().copied().unwrap_or(INVALID_VID);
        self.skeletons.insert(vid, record);
        Ok(vid)
    }

    // ========================================================================
    // Assets & render paths
    // ========================================================================

    pub fn create_asset(&mut self, name: &str, source: &str) -> Result<Vid> {
        let vid = self.register(name, ComponentKind::Asset, None)?;
        let handle = self.asset_handles.insert(vid);
        self.assets.insert(vid, AssetRecord::new(handle, source));
        Ok(vid)
    }

    /// Hands `vid` over to `asset`: every record of `vid` gets the asset as
    /// owner and `vid` joins the asset's ownership set.
    ///
    /// `vid` may be a registered component, another asset or a bare bone
    /// node. Scenes are rejected, and so is an asset that already owns
    /// `asset` directly or indirectly.
    pub fn adopt_into_asset(&mut self, asset: Vid, vid: Vid) -> Result<()> {
        self.expect_kind(asset, ComponentKind::Asset)?;
        if vid == asset {
            return Err(RegistryError::SelfAppend(vid));
        }
        if !self.engine.is_alive(vid) {
            return Err(RegistryError::NotFound(vid));
        }
        match self.kind(vid) {
            Some(kind @ ComponentKind::Scene) => {
                return Err(RegistryError::NotAdoptable { vid, kind });
            }
            Some(ComponentKind::Asset) => self.check_asset_chain(asset, vid)?,
            _ => {}
        }
        let owner = self.get_asset_owner(vid);
        if owner.is_valid() && owner != asset {
            return Err(RegistryError::AssetOwned { vid, owner });
        }
        let Some(handle) = self.assets.get(&asset).map(|a| a.handle) else {
            return Err(RegistryError::NotFound(asset));
        };

        let owned = Some(handle);
        if let Some(r) = self.geometries.get_mut(&vid) {
            r.ownership.asset_owner = owned;
        }
        if let Some(r) = self.materials.get_mut(&vid) {
            r.ownership.asset_owner = owned;
        }
        if let Some(r) = self.material_instances.get_mut(&vid) {
            r.ownership.asset_owner = owned;
        }
        if let Some(r) = self.textures.get_mut(&vid) {
            r.ownership.asset_owner = owned;
        }
        if let Some(r) = self.fonts.get_mut(&vid) {
            r.ownership.asset_owner = owned;
        }
        if let Some(r) = self.skeletons.get_mut(&vid) {
            r.ownership.asset_owner = owned;
        }
        if let Some(record) = self.assets.get_mut(&asset) {
            record.ownership.insert(vid);
        }
        self.touch(vid);
        self.touch(asset);
        Ok(())
    }

    /// Fails if `sub` is `asset` or one of its owners.
    fn check_asset_chain(&self, asset: Vid, sub: Vid) -> Result<()> {
        let mut current = asset;
        for _ in 0..=self.assets.len() {
            if current == sub {
                return Err(RegistryError::OwnershipCycle { vid: sub, asset });
            }
            current = self.get_asset_owner(current);
            if !current.is_valid() {
                return Ok(());
            }
        }
        Err(RegistryError::InvariantViolation(format!(
            "ownership chain above asset {asset:?} does not terminate"
        )))
    }

    /// Creates a swapchain render path (a `Renderer` component).
    pub fn create_renderer(&mut self, name: &str, width: u32, height: u32) -> Result<Vid> {
        self.create_render_path_impl(name, RenderTarget::Swapchain, width, height)
    }

    /// Creates an offscreen render path.
    pub fn create_render_path(&mut self, name: &str, width: u32, height: u32) -> Result<Vid> {
        self.create_render_path_impl(name, RenderTarget::Offscreen, width, height)
    }

    fn create_render_path_impl(
        &mut self,
        name: &str,
        target: RenderTarget,
        width: u32,
        height: u32,
    ) -> Result<Vid> {
        let kind = match target {
            RenderTarget::Swapchain => ComponentKind::Renderer,
            RenderTarget::Offscreen => ComponentKind::RenderPath,
        };
        let vid = self.register(name, kind, None)?;
        self.render_paths
            .insert(vid, RenderPathRecord::new(target, width, height));
        Ok(vid)
    }

    /// Builds the frustum gizmo of `camera`. The geometry is owned by the
    /// camera and removed together with it.
    pub fn create_camera_helper(&mut self, camera: Vid) -> Result<Vid> {
        self.expect_kind(camera, ComponentKind::Camera)?;
        if let Some(existing) = self.cameras.get(&camera).map(|c| c.helper_geometry)
            && self.geometries.contains_key(&existing)
        {
            return Ok(existing);
        }

        let name = format!("{}_helper", self.name(camera).unwrap_or("camera"));
        let positions = vec![
            Vec3::ZERO,
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];
        let indices = vec![0, 1, 0, 2, 0, 3, 0, 4, 1, 2, 2, 3, 3, 4, 4, 1];
        let desc = PrimitiveDesc {
            positions,
            indices: Some(indices),
            topology: PrimitiveTopology::LineList,
        };
        let geometry = self.create_geometry_with(&name, &[desc], Ownership::USER)?;
        if let Some(record) = self.cameras.get_mut(&camera) {
            record.helper_geometry = geometry;
        }
        self.touch(camera);
        Ok(geometry)
    }

    // ========================================================================
    // Bring-up
    // ========================================================================

    pub(crate) fn create_system_resources(&mut self) -> Result<()> {
        let material_name = self.settings().default_material_name.clone();
        let instance_name = self.settings().default_material_instance_name.clone();
        let texture_name = self.settings().default_texture_name.clone();

        let material =
            self.create_material_with(&material_name, ShadingModel::Lit, Ownership::SYSTEM)?;
        let material_instance =
            self.create_material_instance_with(&instance_name, material, Ownership::SYSTEM)?;
        let texture = self.create_texture_with(
            &texture_name,
            1,
            1,
            TextureFormat::Rgba8,
            Ownership::SYSTEM,
        )?;
        self.bind_texture(material_instance, "baseColorMap", texture)?;

        self.system = SystemResources {
            material,
            material_instance,
            texture,
        };
        log::debug!("System resources created");
        Ok(())
    }
}
