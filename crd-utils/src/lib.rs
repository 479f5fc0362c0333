use std::path::{Path, PathBuf};

use kube::{CustomResourceExt, Resource};

pub fn serialize_crd<C>() -> Result<String, serde_yaml::Error>
where
    C: Resource<DynamicType = ()> + CustomResourceExt,
{
    Ok(format!("---\n{}", serde_yaml::to_string(&C::crd())?))
}

/// Write the CRD of `C` to `<path>/<group>/<version>/<Kind>.yaml`, returning
/// the path of the written file.
pub fn write_to_path<C>(path: &Path) -> Result<PathBuf, std::io::Error>
where
    C: Resource<DynamicType = ()> + CustomResourceExt,
{
    let directory = path.join(C::api_version(&()).as_ref());

    std::fs::create_dir_all(&directory)?;

    let file = directory.join(format!("{name}.yaml", name = C::kind(&())));
    let yaml = serialize_crd::<C>().map_err(std::io::Error::other)?;

    std::fs::write(&file, yaml)?;

    Ok(file)
}
