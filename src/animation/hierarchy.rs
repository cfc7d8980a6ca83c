//! Owned copy of a scene node hierarchy

use glam::Mat4;

use crate::model::source::SourceNode;

/// One node of a copied hierarchy
#[derive(Clone, Debug)]
pub struct NodeData {
    pub name: String,
    /// Static transform relative to the parent
    pub transform: Mat4,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Flattened node tree stored in depth-first pre-order, so every parent
/// precedes its children and index 0 is the root.
#[derive(Clone, Debug, Default)]
pub struct NodeTree {
    nodes: Vec<NodeData>,
}

impl NodeTree {
    /// Deep-copy every node under `root` (names, transforms, structure)
    pub fn copy_from(root: &SourceNode) -> Self {
        let mut nodes: Vec<NodeData> = Vec::with_capacity(root.node_count());
        let mut stack: Vec<(&SourceNode, Option<usize>)> = vec![(root, None)];

        while let Some((source, parent)) = stack.pop() {
            let index = nodes.len();
            nodes.push(NodeData {
                name: source.name.clone(),
                transform: source.transform,
                parent,
                children: Vec::with_capacity(source.children.len()),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            // Reversed so children pop in their original order
            for child in source.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&NodeData> {
        self.nodes.first()
    }

    pub fn get(&self, index: usize) -> Option<&NodeData> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    /// Index of the first node (in pre-order) with this name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    /// Compute world transforms for every node.
    ///
    /// `local` supplies each node's local transform; the root is parented
    /// to `root_parent`. `world` is resized to the node count.
    pub fn calculate_world_transforms<F>(&self, root_parent: Mat4, mut local: F, world: &mut Vec<Mat4>)
    where
        F: FnMut(usize, &NodeData) -> Mat4,
    {
        world.clear();
        world.reserve(self.nodes.len());

        for (index, node) in self.nodes.iter().enumerate() {
            let parent_world = match node.parent {
                Some(parent) => world[parent],
                None => root_parent,
            };
            world.push(parent_world * local(index, node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample_hierarchy() -> SourceNode {
        SourceNode::new("root", Mat4::IDENTITY)
            .with_child(
                SourceNode::new("spine", Mat4::from_translation(Vec3::Y))
                    .with_child(SourceNode::new("head", Mat4::from_translation(Vec3::Y))),
            )
            .with_child(SourceNode::new("leg", Mat4::from_translation(Vec3::X)))
    }

    #[test]
    fn test_copy_preserves_preorder() {
        let tree = NodeTree::copy_from(&sample_hierarchy());
        let names: Vec<&str> = tree.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "spine", "head", "leg"]);
    }

    #[test]
    fn test_copy_preserves_structure() {
        let tree = NodeTree::copy_from(&sample_hierarchy());

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root().unwrap().parent, None);
        assert_eq!(tree.root().unwrap().children, vec![1, 3]);
        assert_eq!(tree.get(2).unwrap().parent, Some(1));
        assert_eq!(tree.get(3).unwrap().transform, Mat4::from_translation(Vec3::X));
        assert_eq!(tree.find("head"), Some(2));
        assert_eq!(tree.find("tail"), None);
    }

    #[test]
    fn test_parents_precede_children() {
        let tree = NodeTree::copy_from(&sample_hierarchy());
        for (index, node) in tree.nodes().iter().enumerate() {
            if let Some(parent) = node.parent {
                assert!(parent < index);
            }
        }
    }

    #[test]
    fn test_copy_is_independent_of_source() {
        let mut source = sample_hierarchy();
        let tree = NodeTree::copy_from(&source);

        source.children[0].name = "renamed".to_string();
        source.children.clear();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get(1).unwrap().name, "spine");
    }

    #[test]
    fn test_world_transforms() {
        let tree = NodeTree::copy_from(&sample_hierarchy());
        let mut world = Vec::new();
        let offset = Mat4::from_translation(Vec3::Z);

        tree.calculate_world_transforms(offset, |_, node| node.transform, &mut world);

        assert_eq!(world.len(), 4);
        let head = world[2].to_scale_rotation_translation().2;
        assert!((head - Vec3::new(0.0, 2.0, 1.0)).length() < 1e-5);
        let leg = world[3].to_scale_rotation_translation().2;
        assert!((leg - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_world_transforms_with_override() {
        let tree = NodeTree::copy_from(&sample_hierarchy());
        let mut world = Vec::new();

        // Replace spine's local transform; head inherits the change
        tree.calculate_world_transforms(
            Mat4::IDENTITY,
            |index, node| {
                if index == 1 {
                    Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0))
                } else {
                    node.transform
                }
            },
            &mut world,
        );

        let head = world[2].to_scale_rotation_translation().2;
        assert!((head - Vec3::new(0.0, 6.0, 0.0)).length() < 1e-5);
    }
}
